//! `config.toml` storage.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;

use vocalink_core::config::AppConfig;
use vocalink_core::{Result, VocalinkError};

/// Reads and writes [`AppConfig`] as TOML.
///
/// A missing or empty file loads as the default configuration. Saves go
/// through a temporary file and a rename so readers never see a partial file.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!("No config at {}, using defaults", self.path.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| VocalinkError::config("Config path has no file name"))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        Ok(self.path.with_file_name(tmp_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vocalink_core::config::DEFAULT_SYNTHESIS_URL;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("config.toml"));

        assert_eq!(storage.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("config.toml");
        fs::write(&file_path, "   \n").unwrap();

        let config = ConfigStorage::new(file_path).load().unwrap();
        assert_eq!(config.synthesis.base_url, DEFAULT_SYNTHESIS_URL);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = ConfigStorage::new(temp_dir.path().join("sub").join("config.toml"));
        let mut config = AppConfig::default();
        config.synthesis.base_url = "http://127.0.0.1:50121".to_string();
        config.request_timeout_secs = Some(15);

        storage.save(&config).unwrap();

        assert_eq!(storage.load().unwrap(), config);
        assert!(!temp_dir.path().join("sub").join("config.toml.tmp").exists());
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("config.toml");
        fs::write(&file_path, "[synthesis\nbase_url = 1").unwrap();

        let err = ConfigStorage::new(file_path).load().unwrap_err();
        assert!(matches!(err, VocalinkError::Serialization { ref format, .. } if format == "TOML"));
    }
}
