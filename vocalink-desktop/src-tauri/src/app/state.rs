use std::sync::Arc;

use vocalink_application::App;
use vocalink_core::platform::TokenExchange;
use vocalink_infrastructure::Settings;

use super::requests::{RequestGuard, RequestRegistry};

/// Application state shared across Tauri commands.
pub struct AppState {
    pub app: Arc<App>,
    pub settings: Settings,
    /// Per-call cancellation tokens; all are cancelled on exit.
    pub requests: RequestRegistry,
}

impl AppState {
    /// Cancellation scope for one command call, addressable by `request_id`.
    pub fn begin_request(&self, request_id: Option<String>) -> RequestGuard<'_> {
        self.requests.begin(request_id)
    }

    /// Fills OAuth parameters the frontend left out from `secret.json`.
    pub fn token_exchange(
        &self,
        client_id: Option<String>,
        client_secret: Option<String>,
        code: String,
        redirect_uri: Option<String>,
    ) -> Result<TokenExchange, String> {
        let stored = self.settings.secrets.discord.clone().unwrap_or_default();
        let pick = |given: Option<String>, stored: Option<String>, name: &str| {
            given
                .or(stored)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| format!("Missing {name} for the Discord token exchange"))
        };

        Ok(TokenExchange {
            client_id: pick(client_id, stored.client_id, "client id")?,
            client_secret: pick(client_secret, stored.client_secret, "client secret")?,
            code,
            redirect_uri: pick(redirect_uri, stored.redirect_uri, "redirect URI")?,
        })
    }
}
