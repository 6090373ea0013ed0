// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    if let Err(err) = vocalink_desktop_lib::run() {
        eprintln!("error while running vocalink: {err:#}");
        std::process::exit(1);
    }
}
