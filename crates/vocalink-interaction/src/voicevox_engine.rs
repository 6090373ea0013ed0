//! HTTP client for a VOICEVOX-compatible synthesis engine.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use vocalink_core::Result;
use vocalink_core::config::{DEFAULT_SYNTHESIS_URL, SynthesisConfig};
use vocalink_core::synthesis::{AudioQuery, Speaker, SynthesisEngine, SynthesisQuery};

use crate::http;

const SERVICE: &str = "VOICEVOX";

pub struct VoicevoxEngine {
    client: Client,
    base_url: String,
}

impl VoicevoxEngine {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(client: Client, config: &SynthesisConfig) -> Self {
        Self::new(client, config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Default for VoicevoxEngine {
    fn default() -> Self {
        Self::new(Client::new(), DEFAULT_SYNTHESIS_URL)
    }
}

#[async_trait]
impl SynthesisEngine for VoicevoxEngine {
    async fn audio_query(
        &self,
        query: &SynthesisQuery,
        cancel: &CancellationToken,
    ) -> Result<AudioQuery> {
        let request = self
            .client
            .post(self.endpoint("audio_query"))
            .query(&[("speaker", query.speaker.as_str()), ("text", query.text.as_str())])
            .header(CONTENT_TYPE, "application/json");

        let response = http::send(SERVICE, request, cancel).await?;
        let bytes = http::read_bytes(SERVICE, response, cancel).await?;
        Ok(AudioQuery::new(bytes))
    }

    async fn synthesis(
        &self,
        speaker: &str,
        query: AudioQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let request = self
            .client
            .post(self.endpoint("synthesis"))
            .query(&[("speaker", speaker)])
            .header(CONTENT_TYPE, "application/json")
            .body(query.into_bytes());

        let response = http::send(SERVICE, request, cancel).await?;
        http::read_bytes(SERVICE, response, cancel).await
    }

    async fn speakers(&self, cancel: &CancellationToken) -> Result<Vec<Speaker>> {
        let request = self.client.get(self.endpoint("speakers"));
        let response = http::send(SERVICE, request, cancel).await?;
        http::read_json(SERVICE, response, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let engine = VoicevoxEngine::new(Client::new(), "http://localhost:50021/");
        assert_eq!(engine.endpoint("speakers"), "http://localhost:50021/speakers");
    }

    #[test]
    fn test_default_points_at_local_engine() {
        assert_eq!(VoicevoxEngine::default().base_url(), DEFAULT_SYNTHESIS_URL);
    }
}
