use tauri::State;
use vocalink_core::platform::Guild;

use crate::app::AppState;

/// Lists guilds for `token` without touching the managed bot session.
#[tauri::command]
pub async fn get_user_guilds(
    token: String,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<Vec<Guild>, String> {
    let request = state.begin_request(request_id);
    state
        .app
        .user_guilds(&token, request.token())
        .await
        .map_err(|e| e.to_string())
}

/// Exchanges an OAuth2 authorization code and returns Discord's raw response body.
///
/// Client id, secret and redirect URI fall back to `secret.json` when omitted.
#[tauri::command]
pub async fn fetch_discord_token(
    client_id: Option<String>,
    client_secret: Option<String>,
    code: String,
    redirect_uri: Option<String>,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let exchange = state.token_exchange(client_id, client_secret, code, redirect_uri)?;
    let request = state.begin_request(request_id);
    state
        .app
        .fetch_discord_token(&exchange, request.token())
        .await
        .map_err(|e| e.to_string())
}
