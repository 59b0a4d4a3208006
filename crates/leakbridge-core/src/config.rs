// ── Runtime bridge configuration ──
//
// Describes *what* to poll and how to authenticate. Carries credential
// data and polling tuning, but never touches disk -- the binary loads
// its config file, validates it, and hands a `BridgeConfig` in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Nominal access-token lifetime issued by the vendor (seconds).
pub const NOMINAL_TOKEN_LIFETIME_SECS: u64 = 1800;

/// Configuration for a single bridge instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// OAuth2 consumer key. Also sent as the inventory `apikey`.
    pub consumer_key: String,
    /// OAuth2 consumer secret. `None` switches to shared-proxy mode.
    pub consumer_secret: Option<SecretString>,
    /// Initial refresh token from the vendor account link.
    pub refresh_token: SecretString,
    /// Inventory poll period in minutes.
    pub polling_minutes: u64,
    /// Skip the temperature service on created accessories.
    pub hide_temperature: bool,
    /// Skip the humidity service on created accessories.
    pub hide_humidity: bool,
    /// API root (e.g. `https://api.honeywell.com`).
    pub api_base_url: Url,
    /// OAuth2 token endpoint.
    pub token_url: Url,
    /// Shared token-exchange proxy, used when no consumer secret is set.
    pub proxy_url: Option<Url>,
    /// Request timeout.
    pub timeout: Duration,
    /// Nominal token lifetime; the pre-emptive refresh cycle runs at a
    /// third of this.
    pub token_lifetime_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: None,
            refresh_token: SecretString::from(String::new()),
            polling_minutes: 30,
            hide_temperature: false,
            hide_humidity: false,
            api_base_url: "https://api.honeywell.com".parse().unwrap(),
            token_url: "https://api.honeywell.com/oauth2/token".parse().unwrap(),
            proxy_url: None,
            timeout: Duration::from_secs(30),
            token_lifetime_secs: NOMINAL_TOKEN_LIFETIME_SECS,
        }
    }
}

impl BridgeConfig {
    /// The inventory poll period.
    pub fn polling_period(&self) -> Duration {
        Duration::from_secs(self.polling_minutes.max(1) * 60)
    }

    /// The pre-emptive token refresh period: a third of the nominal
    /// lifetime, so the token never expires between inventory polls.
    pub fn token_refresh_period(&self) -> Duration {
        Duration::from_secs((self.token_lifetime_secs / 3).max(60))
    }
}
