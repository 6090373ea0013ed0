use anyhow::{Context, Result};
use vocalink_core::config::AppConfig;
use vocalink_infrastructure::{ConfigStorage, VocalinkPaths};

pub fn run(paths: &VocalinkPaths) -> Result<()> {
    let storage = ConfigStorage::new(paths.config_file()?);
    if storage.path().exists() {
        println!("Config already exists at {}", storage.path().display());
    } else {
        storage
            .save(&AppConfig::default())
            .with_context(|| format!("Failed to write {}", storage.path().display()))?;
        println!("Wrote {}", storage.path().display());
    }

    let secret_path = paths
        .ensure_secret_file()
        .context("Failed to create secret.json")?;
    println!("Secrets live in {}", secret_path.display());
    Ok(())
}
