use serde::{Deserialize, Serialize};

/// User-defined tag shown in the tag bar even at zero count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomTag {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub icon_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TagSettings {
    pub show_tag_bar: bool,
    pub auto_tag_new_apps: bool,
    pub custom_tags: Vec<CustomTag>,
}

impl Default for TagSettings {
    fn default() -> Self {
        Self {
            show_tag_bar: true,
            auto_tag_new_apps: true,
            custom_tags: Vec::new(),
        }
    }
}

/// The `grid-settings` payload. The hot-corner and global-shortcut fields
/// are persisted for compatibility; the behaviors behind them live outside
/// this program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    pub rows: u32,
    pub cols: u32,
    pub full_width: bool,
    pub hot_corner_enabled: bool,
    pub hot_corner: String,
    pub hot_corner_threshold: f64,
    pub hot_corner_debounce: u64,
    pub global_shortcut: String,
    pub tag_settings: TagSettings,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 7,
            full_width: false,
            hot_corner_enabled: false,
            hot_corner: "disabled".to_string(),
            hot_corner_threshold: 10.0,
            hot_corner_debounce: 300,
            global_shortcut: "F4".to_string(),
            tag_settings: TagSettings::default(),
        }
    }
}

impl GridSettings {
    pub fn page_capacity(&self) -> usize {
        (self.rows.max(1) as usize) * (self.cols.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let settings: GridSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, GridSettings::default());
        assert_eq!(settings.page_capacity(), 35);
    }

    #[test]
    fn round_trips_wire_field_names() {
        let raw = r#"{
            "rows": 2,
            "cols": 5,
            "fullWidth": true,
            "hotCornerEnabled": true,
            "hotCorner": "top-left",
            "hotCornerThreshold": 12.5,
            "hotCornerDebounce": 450,
            "globalShortcut": "F5",
            "tagSettings": {
                "showTagBar": false,
                "autoTagNewApps": false,
                "customTags": [{"key": "work", "label": "Work", "iconName": "briefcase"}]
            }
        }"#;
        let settings: GridSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.page_capacity(), 10);
        assert!(settings.full_width);
        assert_eq!(settings.hot_corner, "top-left");
        assert_eq!(settings.tag_settings.custom_tags[0].icon_name, "briefcase");

        let encoded = serde_json::to_string(&settings).unwrap();
        assert!(encoded.contains("\"fullWidth\""));
        assert!(encoded.contains("\"autoTagNewApps\""));
        let back: GridSettings = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn zero_rows_or_cols_never_zero_capacity() {
        let settings = GridSettings {
            rows: 0,
            cols: 0,
            ..GridSettings::default()
        };
        assert_eq!(settings.page_capacity(), 1);
    }
}
