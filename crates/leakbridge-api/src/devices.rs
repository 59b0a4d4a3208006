// Inventory API HTTP client
//
// Wraps `reqwest::Client` with vendor-specific URL construction: every
// request carries the consumer key as an `apikey` query parameter plus
// a bearer header with the current access token. Returns the raw
// inventory -- filtering to the supported device class happens in the
// reconciliation engine, not here.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{DeviceRecord, Location};
use crate::transport::TransportConfig;

/// Raw HTTP client for the location/device inventory endpoints.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    consumer_key: String,
}

impl DeviceClient {
    /// Create a new inventory client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://api.honeywell.com`).
    pub fn new(
        base_url: Url,
        consumer_key: String,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            consumer_key,
        })
    }

    /// Create an inventory client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, consumer_key: String) -> Self {
        Self {
            http,
            base_url,
            consumer_key,
        }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch all locations, each with its embedded device list.
    pub async fn list_locations(&self, access_token: &str) -> Result<Vec<Location>, Error> {
        let url = self.api_url("v2/locations", &[])?;
        self.get(url, access_token).await
    }

    /// Fetch the devices for a single location.
    pub async fn list_devices(
        &self,
        location_id: &str,
        access_token: &str,
    ) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.api_url("v2/devices", &[("locationId", location_id)])?;
        self.get(url, access_token).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build a full URL for an API path, appending the apikey and any
    /// extra query parameters.
    fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path).map_err(Error::InvalidUrl)?;
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                query.append_pair(k, v);
            }
            query.append_pair("apikey", &self.consumer_key);
        }
        Ok(url)
    }

    /// Send a bearer-authorized GET and parse the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url, access_token: &str) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: if body.is_empty() {
                    "inventory fetch failed".into()
                } else {
                    body
                },
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
