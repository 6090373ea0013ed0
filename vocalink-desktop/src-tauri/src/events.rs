use tauri::{AppHandle, Emitter};
use tokio::sync::mpsc::UnboundedReceiver;
use vocalink_application::AppEvent;

/// Re-emits application events to the webview under their event name.
pub fn spawn_forwarder(handle: AppHandle, mut events: UnboundedReceiver<AppEvent>) {
    tauri::async_runtime::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::debug!("[Desktop] Emitting {}", event.name());
            if let Err(e) = handle.emit(event.name(), &event) {
                tracing::error!("[Desktop] Failed to emit {}: {}", event.name(), e);
            }
        }
    });
}
