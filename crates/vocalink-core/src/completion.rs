//! Chat completion seam.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::conversation::ConversationTurn;
use crate::error::Result;

/// Reply handed back to the caller when the service returned no candidates.
pub const NO_RESPONSE_REPLY: &str = "No response from GPT.";

/// A chat completion service authenticated with a bearer credential.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Stores the credential used for every later request.
    async fn set_credential(&self, credential: String);

    /// Whether [`set_credential`](Self::set_credential) has been called.
    async fn has_credential(&self) -> bool;

    /// Sends `history` and returns the first candidate's text.
    ///
    /// `Ok(None)` means the service answered successfully with an empty
    /// candidate list.
    async fn complete(
        &self,
        history: &[ConversationTurn],
        cancel: &CancellationToken,
    ) -> Result<Option<String>>;
}
