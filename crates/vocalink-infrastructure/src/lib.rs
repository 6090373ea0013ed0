//! Vocalink infrastructure: on-disk configuration and secrets.

pub mod paths;
pub mod settings;
pub mod storage;

pub use crate::paths::VocalinkPaths;
pub use crate::settings::Settings;
pub use crate::storage::{ConfigStorage, SecretStorage};
