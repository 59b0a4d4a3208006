// ── Config file write-back ──
//
// The upstream rotates refresh tokens; a rotation that never reaches
// the config file strands the bridge after a restart. This sink
// rewrites only the `refresh_token` key, round-tripping the rest of
// the document through `toml::Value` so other settings survive.

use std::path::PathBuf;

use tracing::info;

use leakbridge_core::{CoreError, RefreshTokenSink};

/// Persists rotated refresh tokens into the TOML config file.
pub struct ConfigFileSink {
    path: PathBuf,
}

impl ConfigFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RefreshTokenSink for ConfigFileSink {
    fn persist(&self, refresh_token: &str) -> Result<(), CoreError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| CoreError::Persist {
            message: format!("cannot read {}: {e}", self.path.display()),
        })?;

        let mut doc: toml::Value = raw.parse().map_err(|e| CoreError::Persist {
            message: format!("cannot parse {}: {e}", self.path.display()),
        })?;

        let table = doc.as_table_mut().ok_or_else(|| CoreError::Persist {
            message: "config root is not a table".into(),
        })?;
        table.insert(
            "refresh_token".to_owned(),
            toml::Value::String(refresh_token.to_owned()),
        );

        let rendered = toml::to_string_pretty(&doc).map_err(|e| CoreError::Persist {
            message: format!("cannot serialize config: {e}"),
        })?;

        std::fs::write(&self.path, rendered).map_err(|e| CoreError::Persist {
            message: format!("cannot write {}: {e}", self.path.display()),
        })?;

        info!(path = %self.path.display(), "config updated with rotated refresh token");
        Ok(())
    }
}
