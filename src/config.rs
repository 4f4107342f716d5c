//! Runtime configuration, read from the environment with working defaults.
//! CLI flags override the database path; everything else is env-only.

use std::env;
use std::path::PathBuf;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    /// Secret for signing access tokens. Override in any real deployment.
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    pub token_expiry_minutes: i64,
    /// Directory project file blobs are stored under.
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("TRELLIS_JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-env".to_string()),
            token_expiry_minutes: env::var("TRELLIS_TOKEN_EXPIRY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60 * 24),
            upload_dir: env::var("TRELLIS_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::from_env();
        assert!(!config.jwt_secret.is_empty());
        assert!(config.token_expiry_minutes > 0);
    }
}
