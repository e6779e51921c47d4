#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::fs;
use std::path::Path;

use log::info;
use readscreen::ReadScreenApp;

const LOG_CONFIG_DIR: &str = "config";
const LOG_CONFIG_FILE: &str = "config/log4rs.yaml";
const LOG_CONFIG: &str = include_str!("../config/log4rs.yaml");

#[tokio::main]
async fn main() -> eframe::Result {
    init_logger();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    info!("starting ReadScreen");
    eframe::run_native(
        "ReadScreen",
        native_options,
        Box::new(|cc| Ok(Box::new(ReadScreenApp::new(cc)))),
    )
}

// Writes the default logging config next to the binary on first start so
// users can adjust levels without rebuilding.
fn init_logger() {
    if !Path::new(LOG_CONFIG_FILE).exists() {
        let _ = fs::create_dir_all(LOG_CONFIG_DIR);
        let _ = fs::write(LOG_CONFIG_FILE, LOG_CONFIG);
    }
    if let Err(err) = log4rs::init_file(LOG_CONFIG_FILE, log4rs::config::Deserializers::default()) {
        eprintln!("logging setup failed: {err}");
    }
}
