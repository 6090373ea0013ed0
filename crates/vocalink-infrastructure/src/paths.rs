//! Path management for vocalink configuration files.

use std::path::{Path, PathBuf};

use vocalink_core::config::{DiscordSecrets, OpenAIConfig, SecretConfig};
use vocalink_core::config::DEFAULT_COMPLETION_MODEL;
use vocalink_core::{Result, VocalinkError};

const APP_DIR_NAME: &str = "vocalink";

/// Resolves every file vocalink reads or writes.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/vocalink/          # Config directory (platform default via `dirs`)
/// ├── config.toml              # Endpoints and timeouts
/// ├── secret.json              # API keys and bot credentials
/// └── logs/                    # Application logs
///     └── vocalink-desktop.log.YYYY-MM-DD
/// ```
///
/// A base path overrides the platform directory; tests point it at a temp dir.
#[derive(Debug, Clone)]
pub struct VocalinkPaths {
    base: Option<PathBuf>,
}

impl VocalinkPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the vocalink configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| VocalinkError::config("Cannot find the user config directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// The file holds plaintext credentials; [`ensure_secret_file`](Self::ensure_secret_file)
    /// creates it with mode 600 on Unix.
    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Creates `secret.json` with an empty template unless it already exists.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file()?;
        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            openai: Some(OpenAIConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_COMPLETION_MODEL.to_string()),
            }),
            discord: Some(DiscordSecrets::default()),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!("Created secret template at {}", secret_path.display());
        Ok(secret_path)
    }
}

impl Default for VocalinkPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_resolve_under_base() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VocalinkPaths::new(Some(temp_dir.path()));

        assert_eq!(paths.config_file().unwrap(), temp_dir.path().join("config.toml"));
        assert_eq!(paths.secret_file().unwrap(), temp_dir.path().join("secret.json"));
        assert_eq!(paths.logs_dir().unwrap(), temp_dir.path().join("logs"));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VocalinkPaths::new(Some(&temp_dir.path().join("nested")));

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(template.openai.unwrap().api_key, "");

        std::fs::write(&path, r#"{"openai":{"api_key":"sk-kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("sk-kept"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_template_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = VocalinkPaths::new(Some(temp_dir.path()))
            .ensure_secret_file()
            .unwrap();

        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
