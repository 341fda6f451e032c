use eframe::egui;

/// The open folder modal.
pub struct FolderView {
    pub folder_id: String,
    /// Live rename buffer, kept in sync with the folder name.
    pub rename: String,
    /// Content rect as rendered last frame; drop targets are resolved
    /// against it.
    pub rect: Option<egui::Rect>,
}

impl FolderView {
    pub fn open(folder_id: String, name: String) -> Self {
        Self {
            folder_id,
            rename: name,
            rect: None,
        }
    }
}

/// Where the application scan currently stands.
pub enum ScanStatus {
    Scanning,
    Loaded,
    Failed(String),
}
