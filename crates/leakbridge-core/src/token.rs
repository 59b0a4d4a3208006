// ── Token store ──
//
// Owns the OAuth2 access/refresh token pair and its expiry. The cached
// access token is reused while valid; a refresh exchange runs under
// the state lock, so two concurrent callers inside one expiry window
// produce exactly one network exchange.
//
// Rotated refresh tokens are pushed to the RefreshTokenSink
// immediately. That write is best-effort: failure is logged and the
// in-memory token keeps the bridge running.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use leakbridge_api::AuthClient;

use crate::error::CoreError;
use crate::persist::RefreshTokenSink;

/// Safety margin subtracted from the reported lifetime so a token is
/// never handed out seconds before it expires.
const EXPIRY_SKEW_SECS: i64 = 30;

struct TokenState {
    access_token: Option<String>,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Owns the token pair and the refresh protocol.
pub struct TokenStore {
    auth: AuthClient,
    sink: Arc<dyn RefreshTokenSink>,
    state: Mutex<TokenState>,
}

impl TokenStore {
    pub fn new(
        auth: AuthClient,
        initial_refresh_token: &SecretString,
        sink: Arc<dyn RefreshTokenSink>,
    ) -> Self {
        Self {
            auth,
            sink,
            state: Mutex::new(TokenState {
                access_token: None,
                refresh_token: initial_refresh_token.expose_secret().to_owned(),
                // No cached token yet: the first call always exchanges.
                expires_at: DateTime::<Utc>::MIN_UTC,
            }),
        }
    }

    /// Return a valid access token, refreshing through the auth
    /// endpoint if the cached one has expired.
    pub async fn ensure_valid_token(&self) -> Result<String, CoreError> {
        let mut state = self.state.lock().await;

        if let Some(ref token) = state.access_token {
            if Utc::now() < state.expires_at {
                return Ok(token.clone());
            }
        }

        debug!("access token expired; exchanging refresh token");

        let response = match self.auth.exchange(&state.refresh_token).await {
            Ok(resp) => resp,
            Err(e) => {
                // Reset so the next call retries instead of reusing a
                // token suspected invalid.
                state.access_token = None;
                state.expires_at = DateTime::<Utc>::MIN_UTC;
                return Err(CoreError::from(e));
            }
        };

        let lifetime = i64::try_from(response.expires_in).unwrap_or(i64::MAX);
        state.expires_at = Utc::now() + Duration::seconds((lifetime - EXPIRY_SKEW_SECS).max(0));
        state.access_token = Some(response.access_token.clone());

        if let Some(rotated) = response.refresh_token {
            if rotated != state.refresh_token {
                debug!("upstream rotated the refresh token");
                if let Err(e) = self.sink.persist(&rotated) {
                    warn!(error = %e, "failed to persist rotated refresh token; continuing with in-memory value");
                }
                state.refresh_token = rotated;
            }
        }

        Ok(response.access_token)
    }

    /// Force the cached token to expire so the next cycle
    /// re-authenticates. Called after any auth or fetch failure.
    pub async fn force_expire(&self) {
        let mut state = self.state.lock().await;
        state.access_token = None;
        state.expires_at = DateTime::<Utc>::MIN_UTC;
    }

    /// The refresh token currently in memory (rotated or initial).
    pub async fn current_refresh_token(&self) -> String {
        self.state.lock().await.refresh_token.clone()
    }
}
