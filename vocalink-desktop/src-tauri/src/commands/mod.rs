pub mod bot;
pub mod chat;
pub mod discord;
pub mod voice;

use tauri::State;

use crate::app::AppState;

/// Cancels an in-flight command started with the same `request_id`.
/// Returns false when nothing with that id is running.
#[tauri::command]
pub fn cancel_request(request_id: String, state: State<'_, AppState>) -> bool {
    state.requests.cancel(&request_id)
}

pub fn handlers() -> impl Fn(tauri::ipc::Invoke<tauri::Wry>) -> bool + Send + Sync + 'static {
    tauri::generate_handler![
        bot::initialize_bot,
        bot::get_bot_info,
        bot::get_guilds,
        bot::get_guild_members,
        chat::initialize_gpt,
        chat::chat,
        chat::get_history,
        voice::synthesize_audio,
        voice::fetch_speakers,
        discord::get_user_guilds,
        discord::fetch_discord_token,
        cancel_request,
    ]
}
