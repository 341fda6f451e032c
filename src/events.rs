use crate::model::App;
use eframe::egui;
use std::path::PathBuf;

/// Messages posted by background workers to the UI thread.
pub enum UserEvent {
    /// Result of an application scan: fresh app list or an error to show
    /// with a retry affordance.
    AppsLoaded(Result<Vec<App>, String>),
    /// A batch of freshly extracted icons.
    IconsReady(Vec<IconUpdate>),
    /// An application directory changed on disk.
    AppsChanged,
}

pub struct IconRequest {
    pub bundle_id: String,
    pub path: PathBuf,
    pub size: u32,
}

pub struct IconUpdate {
    pub bundle_id: String,
    pub image: egui::ColorImage,
}
