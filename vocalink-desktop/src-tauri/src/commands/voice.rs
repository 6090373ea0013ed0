use tauri::State;
use tauri::ipc::Response;
use vocalink_core::synthesis::Speaker;

use crate::app::AppState;

/// Returns the rendered audio as a raw binary IPC response.
#[tauri::command]
pub async fn synthesize_audio(
    text: String,
    speaker: String,
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<Response, String> {
    let request = state.begin_request(request_id);
    let audio = state
        .app
        .synthesize_audio(&text, &speaker, request.token())
        .await
        .map_err(|e| e.to_string())?;
    Ok(Response::new(audio))
}

#[tauri::command]
pub async fn fetch_speakers(
    request_id: Option<String>,
    state: State<'_, AppState>,
) -> Result<Vec<Speaker>, String> {
    let request = state.begin_request(request_id);
    state
        .app
        .fetch_speakers(request.token())
        .await
        .map_err(|e| e.to_string())
}
