//! Secret configuration file storage.
//!
//! Loads credentials from `secret.json`. The file is never written here;
//! [`VocalinkPaths::ensure_secret_file`](crate::paths::VocalinkPaths::ensure_secret_file)
//! creates the template.

use std::fs;
use std::path::PathBuf;

use vocalink_core::Result;
use vocalink_core::config::SecretConfig;

/// Storage for the secret configuration file (`secret.json`).
///
/// Responsibilities:
/// - Load `secret.json` and parse it into [`SecretConfig`]
/// - Treat a missing file as "no secrets configured"
///
/// Does NOT:
/// - Validate API keys or tokens
/// - Encrypt anything (plaintext JSON storage)
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            tracing::debug!("No secrets at {}", self.path.display());
            return Ok(SecretConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
