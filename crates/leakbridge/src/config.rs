// ── File configuration ──
//
// TOML file + `LEAKBRIDGE_*` env vars, merged via figment, validated
// into the runtime `BridgeConfig` the core consumes. Missing
// credentials are fatal here, at startup -- never mid-cycle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

use leakbridge_core::BridgeConfig;

/// Polling floor (minutes) when no private consumer secret is
/// configured: the shared proxy is rate-limited.
const SHARED_PROXY_MIN_POLLING: u64 = 30;

const DEFAULT_API_BASE: &str = "https://api.honeywell.com";
const DEFAULT_PROXY: &str = "https://homebridge-honeywell.iot.oz.nu/user/refresh";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("you must provide a value for {field}")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Raw on-disk configuration, before validation.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub polling_minutes: Option<u64>,
    #[serde(default)]
    pub hide_temperature: bool,
    #[serde(default)]
    pub hide_humidity: bool,
    pub api_base_url: Option<String>,
    pub token_url: Option<String>,
    pub proxy_url: Option<String>,
    /// Where restored/registered accessories are cached between runs.
    pub cache_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Load the raw config: TOML file, then env overrides.
pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
    let config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("LEAKBRIDGE_"))
        .extract()?;
    Ok(config)
}

impl FileConfig {
    /// Validate and translate into the runtime config.
    pub fn into_bridge_config(self) -> Result<BridgeConfig, ConfigError> {
        let consumer_key = self
            .consumer_key
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingField {
                field: "consumer_key",
            })?;
        let refresh_token = self
            .refresh_token
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingField {
                field: "refresh_token",
            })?;

        let consumer_secret = self.consumer_secret.filter(|s| !s.is_empty());

        let mut polling_minutes = self.polling_minutes.unwrap_or(30);
        if consumer_secret.is_none() && polling_minutes < SHARED_PROXY_MIN_POLLING {
            warn!(
                "no consumer_secret configured; raising polling_minutes to {} for the shared proxy",
                SHARED_PROXY_MIN_POLLING
            );
            polling_minutes = SHARED_PROXY_MIN_POLLING;
        }

        let api_base_url = parse_url(
            "api_base_url",
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE),
        )?;
        let token_url = match self.token_url {
            Some(ref s) => parse_url("token_url", s)?,
            None => api_base_url
                .join("oauth2/token")
                .map_err(|e| ConfigError::Invalid {
                    field: "token_url",
                    reason: e.to_string(),
                })?,
        };
        let proxy_url = parse_url(
            "proxy_url",
            self.proxy_url.as_deref().unwrap_or(DEFAULT_PROXY),
        )?;

        Ok(BridgeConfig {
            consumer_key,
            consumer_secret: consumer_secret.map(SecretString::from),
            refresh_token: SecretString::from(refresh_token),
            polling_minutes,
            hide_temperature: self.hide_temperature,
            hide_humidity: self.hide_humidity,
            api_base_url,
            token_url,
            proxy_url: Some(proxy_url),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(30)),
            ..BridgeConfig::default()
        })
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_validates_a_full_config() {
        let file = write_config(
            r#"
consumer_key = "k"
consumer_secret = "s"
refresh_token = "r0"
polling_minutes = 10
hide_temperature = true
"#,
        );

        let config = load(file.path()).unwrap().into_bridge_config().unwrap();

        assert_eq!(config.consumer_key, "k");
        assert!(config.consumer_secret.is_some());
        assert_eq!(config.polling_minutes, 10);
        assert!(config.hide_temperature);
        assert!(!config.hide_humidity);
        assert_eq!(config.token_url.as_str(), "https://api.honeywell.com/oauth2/token");
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let file = write_config("consumer_key = \"k\"\n");
        let err = load(file.path()).unwrap().into_bridge_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "refresh_token"
            }
        ));

        let file = write_config("refresh_token = \"r0\"\n");
        let err = load(file.path()).unwrap().into_bridge_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "consumer_key"
            }
        ));
    }

    #[test]
    fn missing_secret_clamps_polling_for_the_shared_proxy() {
        let file = write_config(
            r#"
consumer_key = "k"
refresh_token = "r0"
polling_minutes = 5
"#,
        );

        let config = load(file.path()).unwrap().into_bridge_config().unwrap();

        assert!(config.consumer_secret.is_none());
        assert_eq!(config.polling_minutes, SHARED_PROXY_MIN_POLLING);
        assert!(config.proxy_url.is_some());
    }
}
