//! Two-stage text-to-speech: build the engine query, then render it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vocalink_core::synthesis::{Speaker, SynthesisEngine, SynthesisQuery};
use vocalink_core::{Result, VocalinkError};

#[derive(Clone)]
pub struct SynthesisPipeline {
    engine: Arc<dyn SynthesisEngine>,
}

impl SynthesisPipeline {
    pub fn new(engine: Arc<dyn SynthesisEngine>) -> Self {
        Self { engine }
    }

    /// Renders `text` with `speaker` and returns the raw audio.
    ///
    /// The audio stage only runs after the query stage succeeded, and it
    /// receives the query payload unmodified.
    pub async fn synthesize(
        &self,
        text: &str,
        speaker: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        if speaker.trim().is_empty() {
            return Err(VocalinkError::config("Speaker id is empty"));
        }

        let query = SynthesisQuery::new(text, speaker);
        let payload = self.engine.audio_query(&query, cancel).await?;
        tracing::debug!(
            "[Synthesis] Query stage returned {} bytes for speaker {}",
            payload.as_bytes().len(),
            query.speaker
        );

        let audio = self.engine.synthesis(&query.speaker, payload, cancel).await?;
        tracing::debug!("[Synthesis] Rendered {} bytes of audio", audio.len());
        Ok(audio)
    }

    pub async fn fetch_speakers(&self, cancel: &CancellationToken) -> Result<Vec<Speaker>> {
        self.engine.speakers(cancel).await
    }
}
