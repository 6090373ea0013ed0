//! Voice synthesis domain types and the engine seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;

/// A selectable voice offered by the synthesis engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(rename = "speaker_uuid")]
    pub id: Uuid,
    #[serde(default)]
    pub styles: Vec<Style>,
}

/// A sub-variant of a [`Speaker`]. The style `id` is what the engine expects
/// as its `speaker` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub id: i64,
    #[serde(rename = "type", default = "default_style_kind")]
    pub kind: String,
}

fn default_style_kind() -> String {
    "talk".to_string()
}

/// Parameters of the query stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisQuery {
    pub text: String,
    pub speaker: String,
}

impl SynthesisQuery {
    pub fn new(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: speaker.into(),
        }
    }
}

/// Opaque payload returned by the query stage. It is forwarded to the audio
/// stage byte for byte and never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioQuery(Vec<u8>);

impl AudioQuery {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Local text-to-speech engine speaking the two-stage query/synthesis protocol.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Stage 1: builds the engine-specific query for `text` spoken by `speaker`.
    async fn audio_query(
        &self,
        query: &SynthesisQuery,
        cancel: &CancellationToken,
    ) -> Result<AudioQuery>;

    /// Stage 2: renders a stage-1 payload into raw audio bytes.
    async fn synthesis(
        &self,
        speaker: &str,
        query: AudioQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>>;

    /// Lists the speakers currently offered by the engine.
    async fn speakers(&self, cancel: &CancellationToken) -> Result<Vec<Speaker>>;
}
