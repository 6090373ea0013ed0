use tauri::State;
use vocalink_core::platform::{BotInfo, Guild, GuildMember};

use crate::app::AppState;

/// Connects the bot with `token`, replacing any live session.
#[tauri::command]
pub async fn initialize_bot(
    token: String,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let request = state.begin_request(request_id);
    state
        .app
        .initialize_bot(&token, request.token())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_bot_info(state: State<'_, AppState>) -> Result<BotInfo, String> {
    state.app.bot_info().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_guilds(
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<Vec<Guild>, String> {
    let request = state.begin_request(request_id);
    state
        .app
        .guilds(request.token())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_guild_members(
    guild_id: String,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<Vec<GuildMember>, String> {
    let request = state.begin_request(request_id);
    state
        .app
        .guild_members(&guild_id, request.token())
        .await
        .map_err(|e| e.to_string())
}
