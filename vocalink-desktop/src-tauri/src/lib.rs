mod app;
mod commands;
mod events;
mod logging;

use anyhow::{Context, Result};
use tauri::{Manager, RunEvent};
use tauri_plugin_deep_link::DeepLinkExt;
use vocalink_infrastructure::VocalinkPaths;

use crate::app::AppState;
use crate::app::bootstrap::{AppBootstrap, bootstrap};

pub fn run() -> Result<()> {
    let paths = VocalinkPaths::default();
    let _log_guard = logging::init(&paths.logs_dir()?)?;

    let AppBootstrap { app_state, events } =
        tauri::async_runtime::block_on(bootstrap(&paths)).context("Bootstrap failed")?;

    let app = tauri::Builder::default()
        // Must be registered first so a second launch is caught before anything else starts.
        .plugin(tauri_plugin_single_instance::init(|app, argv, _cwd| {
            tracing::info!("[Desktop] Second instance launched with {:?}", argv);
            if let Some(window) = app.get_webview_window("main") {
                if let Err(err) = window.set_focus() {
                    tracing::debug!("[Desktop] Failed to focus the main window: {}", err);
                }
            }
            if let Some(state) = app.try_state::<AppState>() {
                state.app.notify_code_received(argv);
            }
        }))
        .plugin(tauri_plugin_deep_link::init())
        .plugin(tauri_plugin_opener::init())
        .manage(app_state)
        .setup(move |app| {
            #[cfg(any(target_os = "linux", all(debug_assertions, windows)))]
            app.deep_link().register_all()?;

            let handle = app.handle().clone();
            app.deep_link().on_open_url(move |event| {
                let urls: Vec<String> = event.urls().iter().map(|url| url.to_string()).collect();
                tracing::info!("[Desktop] Deep link opened: {:?}", urls);
                if let Some(state) = handle.try_state::<AppState>() {
                    state.app.notify_code_received(urls);
                }
            });

            events::spawn_forwarder(app.handle().clone(), events);
            Ok(())
        })
        .invoke_handler(commands::handlers())
        .build(tauri::generate_context!())
        .context("Failed to build the Tauri application")?;

    app.run(|handle, event| {
        if let RunEvent::Exit = event {
            if let Some(state) = handle.try_state::<AppState>() {
                tracing::info!("[Desktop] Exiting, closing bot session");
                state.requests.shutdown().cancel();
                tauri::async_runtime::block_on(state.app.shutdown());
            }
        }
    });

    Ok(())
}
