use eframe::egui::Color32;

pub const TOP_BAR_HEIGHT: f32 = 48.0;
pub const CONTENT_PADDING: f32 = 28.0;
pub const CELL_ICON_SIDE: f32 = 64.0;
pub const LABEL_HEIGHT: f32 = 18.0;
pub const DOT_RADIUS: f32 = 4.0;
pub const DOT_SPACING: f32 = 18.0;
pub const PAGE_BAR_HEIGHT: f32 = 36.0;
pub const FOLDER_VIEW_WIDTH: f32 = 520.0;
pub const FOLDER_VIEW_HEIGHT: f32 = 380.0;

#[derive(Clone, Copy)]
pub struct LaunchpadTheme {
    pub backdrop: Color32,
    pub cell_hover: Color32,
    pub icon_placeholder: Color32,
    pub folder_well: Color32,
    pub label_color: Color32,
    pub label_dim: Color32,
    pub drop_hint: Color32,
    pub join_hint: Color32,
    pub dot_active: Color32,
    pub dot_inactive: Color32,
    pub toast_bg: Color32,
    pub toast_text: Color32,
    pub banner_bg: Color32,
}

impl Default for LaunchpadTheme {
    fn default() -> Self {
        Self {
            backdrop: Color32::from_rgba_premultiplied(16, 18, 24, 235),
            cell_hover: Color32::from_rgba_premultiplied(255, 255, 255, 14),
            icon_placeholder: Color32::from_rgba_premultiplied(205, 221, 238, 96),
            folder_well: Color32::from_rgba_premultiplied(255, 255, 255, 26),
            label_color: Color32::from_rgb(242, 248, 255),
            label_dim: Color32::from_rgba_premultiplied(220, 230, 244, 140),
            drop_hint: Color32::from_rgba_premultiplied(93, 214, 189, 186),
            join_hint: Color32::from_rgba_premultiplied(120, 175, 240, 200),
            dot_active: Color32::from_rgb(242, 248, 255),
            dot_inactive: Color32::from_rgba_premultiplied(242, 248, 255, 70),
            toast_bg: Color32::from_rgba_premultiplied(8, 12, 18, 236),
            toast_text: Color32::from_rgb(245, 250, 255),
            banner_bg: Color32::from_rgba_premultiplied(120, 40, 40, 220),
        }
    }
}
