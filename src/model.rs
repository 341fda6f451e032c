use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_FOLDER_NAME: &str = "Untitled";

/// A launchable application. The icon is runtime-only state; it arrives
/// after the initial scan and is attached by bundle id.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub bundle_id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub source_folder: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip)]
    pub icon: Option<egui::TextureHandle>,
}

/// User-created grouping of apps. Member order is display order.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub apps: Vec<App>,
}

/// Element type of the ordered grid list.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LaunchpadItem {
    App(App),
    Folder(Folder),
}

impl LaunchpadItem {
    pub fn id(&self) -> &str {
        match self {
            LaunchpadItem::App(app) => &app.bundle_id,
            LaunchpadItem::Folder(folder) => &folder.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            LaunchpadItem::App(app) => &app.name,
            LaunchpadItem::Folder(folder) => &folder.name,
        }
    }

    pub fn as_app(&self) -> Option<&App> {
        match self {
            LaunchpadItem::App(app) => Some(app),
            LaunchpadItem::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            LaunchpadItem::App(_) => None,
            LaunchpadItem::Folder(folder) => Some(folder),
        }
    }
}

static FOLDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Timestamp-derived folder id, disambiguated for same-millisecond creation.
pub fn new_folder_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let seq = FOLDER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("folder-{millis}-{seq}")
}

/// Rebuild the ordered item list from the canonical app set, the persisted
/// folders, and the persisted order map.
///
/// Folder members are reconciled against the canonical apps: stale copies
/// are replaced by bundle-id lookup and members whose app no longer exists
/// are dropped. A folder emptied by reconciliation is dropped with them.
/// Apps referenced by a surviving folder are excluded from the standalone
/// set. The result is stably sorted by rank; ids without a rank sort last
/// in their original relative order.
pub fn merge(
    apps: &[App],
    folders: &[Folder],
    order: &HashMap<String, i64>,
) -> Vec<LaunchpadItem> {
    let by_id: HashMap<&str, &App> = apps.iter().map(|a| (a.bundle_id.as_str(), a)).collect();

    let mut foldered: HashSet<&str> = HashSet::new();
    let mut merged: Vec<LaunchpadItem> = Vec::with_capacity(apps.len() + folders.len());

    for folder in folders {
        let members: Vec<App> = folder
            .apps
            .iter()
            .filter_map(|stale| by_id.get(stale.bundle_id.as_str()).map(|fresh| (*fresh).clone()))
            .collect();
        if members.is_empty() {
            continue;
        }
        for member in &members {
            if let Some((id, _)) = by_id.get_key_value(member.bundle_id.as_str()) {
                foldered.insert(id);
            }
        }
        merged.push(LaunchpadItem::Folder(Folder {
            id: folder.id.clone(),
            name: folder.name.clone(),
            apps: members,
        }));
    }

    for app in apps {
        if !foldered.contains(app.bundle_id.as_str()) {
            merged.push(LaunchpadItem::App(app.clone()));
        }
    }

    merged.sort_by_key(|item| order.get(item.id()).copied().unwrap_or(i64::MAX));
    merged
}

/// Move the element at `from` to `to`. Self-moves and out-of-bounds
/// indices are no-ops.
pub fn reorder(items: &[LaunchpadItem], from: usize, to: usize) -> Vec<LaunchpadItem> {
    if from == to || from >= items.len() || to >= items.len() {
        return items.to_vec();
    }
    let mut out = items.to_vec();
    let item = out.remove(from);
    out.insert(to, item);
    out
}

/// Merge two standalone apps into a new folder at the lower index, target
/// app first. Anything but two distinct standalone apps is a no-op.
pub fn create_folder_from(
    items: &[LaunchpadItem],
    dragged: usize,
    target: usize,
) -> Vec<LaunchpadItem> {
    if dragged == target || dragged >= items.len() || target >= items.len() {
        return items.to_vec();
    }
    let (Some(dragged_app), Some(target_app)) = (items[dragged].as_app(), items[target].as_app())
    else {
        return items.to_vec();
    };

    let folder = Folder {
        id: new_folder_id(),
        name: DEFAULT_FOLDER_NAME.to_string(),
        apps: vec![target_app.clone(), dragged_app.clone()],
    };

    let mut out = items.to_vec();
    let (hi, lo) = if dragged > target {
        (dragged, target)
    } else {
        (target, dragged)
    };
    out.remove(hi);
    out.remove(lo);
    out.insert(lo, LaunchpadItem::Folder(folder));
    out
}

/// Append the standalone app at `app_index` to the folder at
/// `folder_index`, removing the standalone entry.
pub fn add_to_folder(
    items: &[LaunchpadItem],
    app_index: usize,
    folder_index: usize,
) -> Vec<LaunchpadItem> {
    if app_index == folder_index || app_index >= items.len() || folder_index >= items.len() {
        return items.to_vec();
    }
    let Some(app) = items[app_index].as_app().cloned() else {
        return items.to_vec();
    };
    if items[folder_index].as_folder().is_none() {
        return items.to_vec();
    }

    let mut out = items.to_vec();
    out.remove(app_index);
    let folder_pos = if app_index < folder_index {
        folder_index - 1
    } else {
        folder_index
    };
    if let LaunchpadItem::Folder(folder) = &mut out[folder_pos] {
        folder.apps.push(app);
    }
    out
}

/// Remove an app from a folder; the app rejoins the standalone tail. A
/// folder emptied by the removal is deleted from the list.
pub fn remove_from_folder(
    items: &[LaunchpadItem],
    folder_id: &str,
    bundle_id: &str,
) -> Vec<LaunchpadItem> {
    let Some(pos) = items
        .iter()
        .position(|item| matches!(item, LaunchpadItem::Folder(f) if f.id == folder_id))
    else {
        return items.to_vec();
    };

    let mut out = items.to_vec();
    let mut removed = None;
    let mut emptied = false;
    if let LaunchpadItem::Folder(folder) = &mut out[pos] {
        if let Some(member) = folder.apps.iter().position(|a| a.bundle_id == bundle_id) {
            removed = Some(folder.apps.remove(member));
            emptied = folder.apps.is_empty();
        }
    }
    let Some(app) = removed else {
        return items.to_vec();
    };

    if emptied {
        out.remove(pos);
    }
    out.push(LaunchpadItem::App(app));
    out
}

/// Rename a folder. Empty names are permitted here; validation is the
/// caller's concern.
pub fn rename_folder(items: &[LaunchpadItem], folder_id: &str, name: &str) -> Vec<LaunchpadItem> {
    let mut out = items.to_vec();
    for item in &mut out {
        if let LaunchpadItem::Folder(folder) = item {
            if folder.id == folder_id {
                folder.name = name.to_string();
            }
        }
    }
    out
}

/// Dissolve a folder, splicing its apps back into the list at the
/// folder's position.
pub fn disband_folder(items: &[LaunchpadItem], folder_id: &str) -> Vec<LaunchpadItem> {
    let Some(pos) = items
        .iter()
        .position(|item| matches!(item, LaunchpadItem::Folder(f) if f.id == folder_id))
    else {
        return items.to_vec();
    };

    let mut out = items.to_vec();
    if let LaunchpadItem::Folder(folder) = out.remove(pos) {
        for (offset, app) in folder.apps.into_iter().enumerate() {
            out.insert(pos + offset, LaunchpadItem::App(app));
        }
    }
    out
}

/// Enumerate list positions into the persisted `item-order` map.
pub fn order_of(items: &[LaunchpadItem]) -> HashMap<String, i64> {
    items
        .iter()
        .enumerate()
        .map(|(rank, item)| (item.id().to_string(), rank as i64))
        .collect()
}

/// Extract the folders in list order for the persisted `folders` key.
pub fn folders_in(items: &[LaunchpadItem]) -> Vec<Folder> {
    items
        .iter()
        .filter_map(|item| item.as_folder().cloned())
        .collect()
}

/// Attach an icon texture to every occurrence of a bundle id, standalone
/// or foldered, without disturbing anything else.
pub fn attach_icon(items: &mut [LaunchpadItem], bundle_id: &str, texture: &egui::TextureHandle) {
    for item in items {
        match item {
            LaunchpadItem::App(app) => {
                if app.bundle_id == bundle_id {
                    app.icon = Some(texture.clone());
                }
            }
            LaunchpadItem::Folder(folder) => {
                for app in &mut folder.apps {
                    if app.bundle_id == bundle_id {
                        app.icon = Some(texture.clone());
                    }
                }
            }
        }
    }
}
