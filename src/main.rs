#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod app;
mod branding;
mod config;
mod drag;
mod events;
mod filter;
mod icons;
mod model;
mod pagination;
mod store;
mod system;

use crate::app::LaunchpadApp;
use crate::branding::APP_DISPLAY_NAME;
use crate::config::GridSettings;
use crate::store::{Store, KEY_GRID_SETTINGS};
use eframe::egui;

const WINDOW_WIDTH: f32 = 1024.0;
const WINDOW_HEIGHT: f32 = 768.0;
const MIN_WINDOW_WIDTH: f32 = 640.0;
const MIN_WINDOW_HEIGHT: f32 = 480.0;

fn main() -> eframe::Result<()> {
    let settings: GridSettings = Store::open().read(KEY_GRID_SETTINGS);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_DISPLAY_NAME)
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT])
            .with_maximized(settings.full_width),
        ..Default::default()
    };

    eframe::run_native(
        APP_DISPLAY_NAME,
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(LaunchpadApp::new(cc)))
        }),
    )
}
