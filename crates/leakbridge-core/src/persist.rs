// ── Refresh-token persistence boundary ──
//
// The upstream rotates refresh tokens; a rotated token must reach the
// config store or the bridge cannot re-authenticate after a restart.
// The write is best-effort: the token store logs a failure and keeps
// operating with the in-memory value.

use crate::error::CoreError;

/// External config store that receives rotated refresh tokens.
pub trait RefreshTokenSink: Send + Sync {
    fn persist(&self, refresh_token: &str) -> Result<(), CoreError>;
}

/// Sink that discards rotations. Useful for tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl RefreshTokenSink for NullSink {
    fn persist(&self, _refresh_token: &str) -> Result<(), CoreError> {
        Ok(())
    }
}
