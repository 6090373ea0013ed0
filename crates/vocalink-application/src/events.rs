//! Events pushed from the core to the presentation layer.

use serde::Serialize;

/// Name under which [`AppEvent::CodeReceived`] is emitted to the frontend.
pub const CODE_RECEIVED_EVENT: &str = "codeReceived";

/// Externally-triggered notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AppEvent {
    /// A deep link was opened or a second instance was launched; carries the
    /// URL(s) or launch arguments so the frontend can pick up an OAuth code.
    CodeReceived(Vec<String>),
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::CodeReceived(_) => CODE_RECEIVED_EVENT,
        }
    }
}
