//! Vocalink application layer: the orchestrator and the components it owns.

pub mod app;
pub mod events;
pub mod session_manager;
pub mod synthesis_pipeline;

pub use app::App;
pub use events::{AppEvent, CODE_RECEIVED_EVENT};
pub use session_manager::SessionManager;
pub use synthesis_pipeline::SynthesisPipeline;
