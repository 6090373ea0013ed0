use tauri::State;
use vocalink_core::conversation::ConversationTurn;

use crate::app::AppState;

#[tauri::command]
pub async fn initialize_gpt(token: String, state: State<'_, AppState>) -> Result<(), String> {
    state
        .app
        .initialize_gpt(&token)
        .await
        .map_err(|e| e.to_string())
}

/// Sends `prompt` with the conversation so far and returns the reply text.
#[tauri::command]
pub async fn chat(
    prompt: String,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let request = state.begin_request(request_id);
    state
        .app
        .chat(&prompt, request.token())
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_history(state: State<'_, AppState>) -> Result<Vec<ConversationTurn>, String> {
    Ok(state.app.history().await)
}
