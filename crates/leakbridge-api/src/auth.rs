// OAuth2 refresh-token exchange
//
// Two exchange flows, mirroring upstream:
// - direct: POST to the vendor token endpoint with HTTP basic auth of
//   consumer key/secret and a form-encoded grant.
// - shared proxy: when no private consumer secret is configured, relay
//   the refresh token through a shared proxy endpoint as JSON.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Response body of a successful token exchange.
///
/// `refresh_token` is optional: the upstream rotates it on some
/// exchanges and omits it on others. `expires_in` arrives as either a
/// JSON number or a numeric string depending on API vintage.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(deserialize_with = "de_expires_in")]
    pub expires_in: u64,
}

fn de_expires_in<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(u64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Client for the OAuth2 token endpoint.
///
/// Stateless: performs one exchange per call and returns the parsed
/// response. Token caching and rotation persistence live in
/// `leakbridge-core`'s token store.
pub struct AuthClient {
    http: reqwest::Client,
    token_url: Url,
    proxy_url: Option<Url>,
    consumer_key: String,
    consumer_secret: Option<SecretString>,
}

impl AuthClient {
    /// Create a new auth client from a `TransportConfig`.
    ///
    /// `token_url` is the vendor token endpoint; `proxy_url` is the
    /// shared relay used when `consumer_secret` is `None`.
    pub fn new(
        token_url: Url,
        proxy_url: Option<Url>,
        consumer_key: String,
        consumer_secret: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            token_url,
            proxy_url,
            consumer_key,
            consumer_secret,
        })
    }

    /// Create an auth client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        token_url: Url,
        proxy_url: Option<Url>,
        consumer_key: String,
        consumer_secret: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            token_url,
            proxy_url,
            consumer_key,
            consumer_secret,
        }
    }

    /// The configured consumer key (also used as the inventory apikey).
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// Uses the direct flow when a consumer secret is configured,
    /// otherwise relays through the shared proxy.
    pub async fn exchange(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        match &self.consumer_secret {
            Some(secret) => self.exchange_direct(refresh_token, secret).await,
            None => self.exchange_via_proxy(refresh_token).await,
        }
    }

    async fn exchange_direct(
        &self,
        refresh_token: &str,
        secret: &SecretString,
    ) -> Result<TokenResponse, Error> {
        debug!("POST {} (grant_type=refresh_token)", self.token_url);

        let resp = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.consumer_key, Some(secret.expose_secret()))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_token_response(resp).await
    }

    async fn exchange_via_proxy(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let proxy_url = self.proxy_url.clone().ok_or_else(|| Error::Auth {
            message: "no consumer secret and no proxy endpoint configured".into(),
        })?;

        debug!("POST {} (shared proxy exchange)", proxy_url);

        let resp = self
            .http
            .post(proxy_url)
            .json(&json!({
                "consumerKey": self.consumer_key,
                "refresh_token": refresh_token,
            }))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_token_response(resp).await
    }

    async fn parse_token_response(resp: reqwest::Response) -> Result<TokenResponse, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Auth {
                message: format!("token endpoint returned HTTP {status}: {body}"),
            });
        }

        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Auth {
                message: format!("malformed token response: {e}"),
            })?;

        if token.access_token.is_empty() {
            return Err(Error::Auth {
                message: "token response missing access_token".into(),
            });
        }

        Ok(token)
    }
}
