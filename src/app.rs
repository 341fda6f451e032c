mod runtime;
mod state;
mod style;
mod ui;

use crate::config::{CustomTag, GridSettings};
use crate::drag::{DragEngine, DropResolution};
use crate::events::IconRequest;
use crate::filter;
use crate::model::{self, App, LaunchpadItem};
use crate::pagination;
use crate::store::{
    Store, KEY_CUSTOM_TAGS, KEY_FOLDERS, KEY_GRID_SETTINGS, KEY_ITEM_ORDER, KEY_TAG_ASSIGNMENTS,
};
use crate::system;
use eframe::egui;
use log::warn;
use state::{FolderView, ScanStatus};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Requested side for extracted icon textures.
const ICON_REQUEST_SIDE: u32 = 128;

pub struct LaunchpadApp {
    runtime: runtime::RuntimeHandles,
    store: Store,
    settings: GridSettings,

    /// Canonical enumerated apps, stored tags applied.
    apps: Vec<App>,
    /// The ordered grid list; source of truth for layout while running.
    items: Vec<LaunchpadItem>,
    tag_assignments: HashMap<String, Vec<String>>,
    custom_tags: Vec<CustomTag>,

    drag: DragEngine,
    page: usize,
    query: String,
    selected_tag: Option<String>,
    folder_view: Option<FolderView>,
    settings_open: bool,
    new_tag_key: String,
    new_tag_label: String,

    scan: ScanStatus,
    toast: Option<(String, Instant)>,
    icon_requested: HashSet<String>,
}

impl LaunchpadApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let store = Store::open();
        let settings: GridSettings = store.read(KEY_GRID_SETTINGS);
        let custom_tags = filter::dedupe_custom_tags(store.read(KEY_CUSTOM_TAGS));
        let tag_assignments: HashMap<String, Vec<String>> = store.read(KEY_TAG_ASSIGNMENTS);

        let runtime = runtime::build_runtime(&cc.egui_ctx);

        Self {
            runtime,
            store,
            settings,
            apps: Vec::new(),
            items: Vec::new(),
            tag_assignments,
            custom_tags,
            drag: DragEngine::new(),
            page: 0,
            query: String::new(),
            selected_tag: None,
            folder_view: None,
            settings_open: false,
            new_tag_key: String::new(),
            new_tag_label: String::new(),
            scan: ScanStatus::Scanning,
            toast: None,
            icon_requested: HashSet::new(),
        }
    }

    /// Fold a fresh scan into the session. Stored tags are re-attached (an
    /// app list refresh never resets assignments) and the current layout —
    /// or the persisted one on first load — decides folders and order.
    fn install_scanned_apps(&mut self, mut apps: Vec<App>) {
        filter::apply_tag_assignments(
            &mut apps,
            &self.tag_assignments,
            self.settings.tag_settings.auto_tag_new_apps,
        );

        // Icons survive a rescan; only new bundles need extraction.
        let old: HashMap<String, Option<egui::TextureHandle>> = self
            .apps
            .drain(..)
            .map(|app| (app.bundle_id.clone(), app.icon))
            .collect();
        for app in &mut apps {
            if let Some(icon) = old.get(&app.bundle_id) {
                app.icon = icon.clone();
            }
        }

        let (folders, order) = if self.items.is_empty() {
            (self.store.read(KEY_FOLDERS), self.store.read(KEY_ITEM_ORDER))
        } else {
            (model::folders_in(&self.items), model::order_of(&self.items))
        };

        self.apps = apps;
        self.items = model::merge(&self.apps, &folders, &order);
        self.scan = ScanStatus::Loaded;
        self.clamp_page();
        self.request_missing_icons();
    }

    fn request_missing_icons(&mut self) {
        for app in &self.apps {
            if app.icon.is_some() || self.icon_requested.contains(&app.bundle_id) {
                continue;
            }
            self.icon_requested.insert(app.bundle_id.clone());
            let _ = self.runtime.icon_req_tx.send(IconRequest {
                bundle_id: app.bundle_id.clone(),
                path: app.path.clone().into(),
                size: ICON_REQUEST_SIDE,
            });
        }
    }

    fn attach_icon_texture(&mut self, ctx: &egui::Context, bundle_id: &str, image: egui::ColorImage) {
        let texture = ctx.load_texture(
            format!("icon:{bundle_id}"),
            image,
            egui::TextureOptions::LINEAR,
        );
        for app in &mut self.apps {
            if app.bundle_id == bundle_id {
                app.icon = Some(texture.clone());
            }
        }
        model::attach_icon(&mut self.items, bundle_id, &texture);
    }

    fn request_rescan(&mut self) {
        self.scan = ScanStatus::Scanning;
        let _ = self.runtime.scan_tx.send(());
    }

    /// Layout mutations persist synchronously; there is no deferred save.
    fn persist_layout(&self) {
        self.store.write(KEY_ITEM_ORDER, &model::order_of(&self.items));
        self.store.write(KEY_FOLDERS, &model::folders_in(&self.items));
    }

    fn persist_settings(&mut self) {
        self.settings.tag_settings.custom_tags = self.custom_tags.clone();
        self.store.write(KEY_GRID_SETTINGS, &self.settings);
    }

    fn persist_tag_assignments(&self) {
        self.store.write(KEY_TAG_ASSIGNMENTS, &self.tag_assignments);
    }

    fn persist_custom_tags(&mut self) {
        self.custom_tags = filter::dedupe_custom_tags(self.custom_tags.clone());
        self.store.write(KEY_CUSTOM_TAGS, &self.custom_tags);
        self.persist_settings();
    }

    fn apply_drop(&mut self, resolution: DropResolution) {
        let next = match resolution {
            DropResolution::CreateFolder { dragged, target } => {
                model::create_folder_from(&self.items, dragged, target)
            }
            DropResolution::AddToFolder { app_index, folder_index } => {
                model::add_to_folder(&self.items, app_index, folder_index)
            }
            DropResolution::Reorder { from, to } => model::reorder(&self.items, from, to),
            DropResolution::RemoveFromFolder { folder_id, bundle_id } => {
                let next = model::remove_from_folder(&self.items, &folder_id, &bundle_id);
                let folder_gone = !next.iter().any(|item| item.id() == folder_id);
                if folder_gone {
                    self.folder_view = None;
                }
                next
            }
            DropResolution::None => return,
        };
        self.items = next;
        self.clamp_page();
        self.persist_layout();
    }

    fn open_folder(&mut self, folder_id: &str) {
        let Some(folder) = self
            .items
            .iter()
            .find_map(|item| item.as_folder().filter(|f| f.id == folder_id))
        else {
            return;
        };
        self.folder_view = Some(FolderView::open(folder.id.clone(), folder.name.clone()));
    }

    fn rename_open_folder(&mut self, name: &str) {
        let Some(view) = &self.folder_view else {
            return;
        };
        self.items = model::rename_folder(&self.items, &view.folder_id, name);
        self.persist_layout();
    }

    fn disband_folder(&mut self, folder_id: &str) {
        self.items = model::disband_folder(&self.items, folder_id);
        if self
            .folder_view
            .as_ref()
            .is_some_and(|view| view.folder_id == folder_id)
        {
            self.folder_view = None;
        }
        self.clamp_page();
        self.persist_layout();
    }

    /// Toggling writes an explicit assignment entry, even when it matches
    /// what detection produced — from then on the user's list is canonical.
    fn toggle_tag(&mut self, bundle_id: &str, tag: &str) {
        let mut tags = self
            .apps
            .iter()
            .find(|app| app.bundle_id == bundle_id)
            .map(|app| app.tags.clone())
            .unwrap_or_default();
        if let Some(pos) = tags.iter().position(|t| t == tag) {
            tags.remove(pos);
        } else {
            tags.push(tag.to_string());
        }
        self.tag_assignments.insert(bundle_id.to_string(), tags);
        self.persist_tag_assignments();
        self.refresh_tags();
    }

    /// The sole bulk clear: wipes every assignment and rescans so detected
    /// tags can reappear.
    fn reset_all_tags(&mut self) {
        self.tag_assignments.clear();
        self.persist_tag_assignments();
        self.request_rescan();
    }

    fn refresh_tags(&mut self) {
        filter::apply_tag_assignments(
            &mut self.apps,
            &self.tag_assignments,
            self.settings.tag_settings.auto_tag_new_apps,
        );
        let folders = model::folders_in(&self.items);
        let order = model::order_of(&self.items);
        self.items = model::merge(&self.apps, &folders, &order);
    }

    fn add_custom_tag(&mut self, key: String, label: String) {
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        let label = if label.trim().is_empty() {
            key.clone()
        } else {
            label.trim().to_string()
        };
        self.custom_tags.push(CustomTag {
            key,
            label,
            icon_name: String::new(),
        });
        self.persist_custom_tags();
    }

    fn remove_custom_tag(&mut self, key: &str) {
        self.custom_tags.retain(|tag| tag.key != key);
        if self.selected_tag.as_deref() == Some(key) {
            self.selected_tag = None;
        }
        self.persist_custom_tags();
    }

    fn launch(&mut self, path: &str) {
        if let Err(err) = system::launch_app(path) {
            warn!("{err:#}");
            self.show_toast(format!("{err:#}"));
        }
    }

    fn reveal(&mut self, path: &str) {
        if let Err(err) = system::reveal_in_finder(path) {
            warn!("{err:#}");
            self.show_toast(format!("{err:#}"));
        }
    }

    fn trash(&mut self, path: &str) {
        match system::move_to_trash(path) {
            // The watcher also notices, but a direct rescan is immediate.
            Ok(()) => self.request_rescan(),
            Err(err) => {
                warn!("{err:#}");
                self.show_toast(format!("{err:#}"));
            }
        }
    }

    fn show_toast<S: Into<String>>(&mut self, message: S) {
        self.toast = Some((message.into(), Instant::now()));
    }

    fn is_filtering(&self) -> bool {
        filter::is_filtering(&self.query, self.selected_tag.as_deref())
    }

    fn visible_items(&self) -> Vec<LaunchpadItem> {
        filter::visible_items(&self.items, &self.query, self.selected_tag.as_deref())
    }

    fn page_count(&self) -> usize {
        pagination::page_count(self.items.len(), self.settings.page_capacity())
    }

    fn clamp_page(&mut self) {
        self.page = self.page.min(self.page_count() - 1);
    }
}
