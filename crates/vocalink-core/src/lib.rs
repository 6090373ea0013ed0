//! Domain types and service seams shared by every Vocalink crate.

pub mod cancel;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod error;
pub mod platform;
pub mod synthesis;

// Re-export common error type
pub use error::{Result, VocalinkError};

pub use tokio_util::sync::CancellationToken;
