pub mod bootstrap;
pub mod requests;
pub mod state;

pub use state::AppState;
