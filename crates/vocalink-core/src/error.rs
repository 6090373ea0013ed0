//! Error types for the Vocalink application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Vocalink application.
///
/// Variants group into four families:
/// - transport: [`Transport`](Self::Transport), [`HttpStatus`](Self::HttpStatus)
/// - protocol: [`Protocol`](Self::Protocol)
/// - state: [`NotConnected`](Self::NotConnected), [`MissingCredential`](Self::MissingCredential)
/// - configuration: [`Config`](Self::Config)
///
/// plus local I/O and serialization errors raised by the config layer.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VocalinkError {
    /// Network, DNS or connection failure talking to an external service
    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    /// An external service answered with a non-success HTTP status
    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatus {
        service: String,
        status: u16,
        body: String,
    },

    /// Unexpected response shape from an external service
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The operation needs a live messaging session but none is connected
    #[error("Not connected: no active bot session")]
    NotConnected,

    /// The operation needs a credential that has not been initialized
    #[error("Missing credential: {0} has not been initialized")]
    MissingCredential(String),

    /// Malformed input or configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller abandoned the request
    #[error("Request cancelled")]
    Cancelled,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },
}

impl VocalinkError {
    /// Creates a Transport error
    pub fn transport(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Creates an HttpStatus error
    pub fn http_status(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for network failures and non-success statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// True when the operation was attempted in the wrong lifecycle state.
    pub fn is_state(&self) -> bool {
        matches!(self, Self::NotConnected | Self::MissingCredential(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for VocalinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VocalinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VocalinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VocalinkError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, VocalinkError>`.
pub type Result<T> = std::result::Result<T, VocalinkError>;
