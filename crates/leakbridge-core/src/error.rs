// ── Core error types ──
//
// User-facing errors from leakbridge-core. Consumers never see raw
// HTTP status codes or JSON parse failures directly -- the
// `From<leakbridge_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.
//
// Only `Config` is startup-fatal. Everything else is caught at the
// cycle boundary, logged, and leaves the last-known-good state intact.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Token exchange failed -- the next cycle re-authenticates.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Inventory or device fetch failed -- the previous reconcile's
    /// state is left untouched for this cycle.
    #[error("Inventory fetch failed: {message}")]
    FetchFailed {
        message: String,
        status: Option<u16>,
    },

    /// Missing or invalid configuration. The only fatal variant:
    /// construction aborts rather than running without credentials.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Refresh-token write-back failed. Logged and ignored -- the
    /// in-memory token keeps working.
    #[error("Failed to persist refresh token: {message}")]
    Persist { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for errors that should force a token refresh on
    /// the next cycle.
    pub fn invalidates_token(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::FetchFailed { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<leakbridge_api::Error> for CoreError {
    fn from(err: leakbridge_api::Error) -> Self {
        match err {
            leakbridge_api::Error::Auth { message } => {
                CoreError::AuthenticationFailed { message }
            }
            leakbridge_api::Error::Api { message, status: 401 } => {
                CoreError::AuthenticationFailed {
                    message: format!("access token rejected: {message}"),
                }
            }
            leakbridge_api::Error::Api { message, status } => CoreError::FetchFailed {
                message,
                status: Some(status),
            },
            leakbridge_api::Error::Transport(e) => CoreError::FetchFailed {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            leakbridge_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            leakbridge_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
