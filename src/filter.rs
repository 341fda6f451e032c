use crate::config::CustomTag;
use crate::model::{App, LaunchpadItem};
use std::collections::{HashMap, HashSet};

pub struct TagDef {
    pub key: &'static str,
    pub label: &'static str,
}

/// Built-in categories the scanner can detect. Hidden from the tag bar
/// while no app carries them.
pub const PREDEFINED_TAGS: &[TagDef] = &[
    TagDef { key: "browsers", label: "Browsers" },
    TagDef { key: "office", label: "Office" },
    TagDef { key: "utilities", label: "Utilities" },
    TagDef { key: "social", label: "Social" },
    TagDef { key: "dev-tools", label: "Dev Tools" },
    TagDef { key: "creativity", label: "Creativity" },
    TagDef { key: "entertainment", label: "Entertainment" },
    TagDef { key: "planning", label: "Planning" },
];

pub fn is_filtering(query: &str, tag: Option<&str>) -> bool {
    !query.trim().is_empty() || tag.is_some()
}

/// The visible subset under the current search string and selected tag.
/// Both predicates apply; either alone passes everything through.
pub fn visible_items(
    items: &[LaunchpadItem],
    query: &str,
    tag: Option<&str>,
) -> Vec<LaunchpadItem> {
    let needle = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| matches_tag(item, tag) && matches_query(item, &needle))
        .cloned()
        .collect()
}

/// Folders have no tag membership and drop out entirely under a tag filter.
fn matches_tag(item: &LaunchpadItem, tag: Option<&str>) -> bool {
    let Some(tag) = tag else {
        return true;
    };
    match item {
        LaunchpadItem::App(app) => app.tags.iter().any(|t| t == tag),
        LaunchpadItem::Folder(_) => false,
    }
}

/// Case-insensitive substring match; a folder matches on its own name or
/// through any contained app.
fn matches_query(item: &LaunchpadItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    match item {
        LaunchpadItem::App(app) => app.name.to_lowercase().contains(needle),
        LaunchpadItem::Folder(folder) => {
            folder.name.to_lowercase().contains(needle)
                || folder.apps.iter().any(|a| a.name.to_lowercase().contains(needle))
        }
    }
}

/// Tag usage over the full unfiltered app set (foldered apps included).
pub fn tag_counts(apps: &[App]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for app in apps {
        for tag in &app.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub custom: bool,
}

/// Chips for the tag bar: predefined tags only while in use, custom tags
/// always (so an empty tag is still reachable for assignment).
pub fn tag_bar_chips(apps: &[App], custom: &[CustomTag]) -> Vec<TagChip> {
    let counts = tag_counts(apps);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut chips = Vec::new();

    for def in PREDEFINED_TAGS {
        let count = counts.get(def.key).copied().unwrap_or(0);
        if count > 0 && seen.insert(def.key) {
            chips.push(TagChip {
                key: def.key.to_string(),
                label: def.label.to_string(),
                count,
                custom: false,
            });
        }
    }
    for tag in custom {
        if seen.insert(tag.key.as_str()) {
            chips.push(TagChip {
                key: tag.key.clone(),
                label: tag.label.clone(),
                count: counts.get(&tag.key).copied().unwrap_or(0),
                custom: true,
            });
        }
    }
    chips
}

/// Deduplicate the persisted `custom-tags` array by key, last write wins.
pub fn dedupe_custom_tags(tags: Vec<CustomTag>) -> Vec<CustomTag> {
    let mut out = Vec::with_capacity(tags.len());
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags.into_iter().rev() {
        if seen.insert(tag.key.clone()) {
            out.push(tag);
        }
    }
    out.reverse();
    out
}

/// Attach stored tag assignments to freshly scanned apps.
///
/// A stored entry always wins, including an explicit empty list — a
/// rescan must never reset what the user assigned. Apps with no entry keep
/// their scanner-detected tags only when auto-tagging is on.
pub fn apply_tag_assignments(
    apps: &mut [App],
    assignments: &HashMap<String, Vec<String>>,
    auto_tag_new_apps: bool,
) {
    for app in apps {
        if let Some(stored) = assignments.get(&app.bundle_id) {
            app.tags = stored.clone();
        } else if !auto_tag_new_apps {
            app.tags.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Folder;

    fn app(name: &str, tags: &[&str]) -> App {
        App {
            bundle_id: format!("com.test.{}", name.to_lowercase()),
            name: name.to_string(),
            path: format!("/Applications/{name}.app"),
            source_folder: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            icon: None,
        }
    }

    fn folder_item(id: &str, name: &str, apps: Vec<App>) -> LaunchpadItem {
        LaunchpadItem::Folder(Folder {
            id: id.to_string(),
            name: name.to_string(),
            apps,
        })
    }

    fn custom(key: &str, label: &str) -> CustomTag {
        CustomTag {
            key: key.to_string(),
            label: label.to_string(),
            icon_name: String::new(),
        }
    }

    #[test]
    fn tag_filter_excludes_folders_entirely() {
        let mut items: Vec<LaunchpadItem> = Vec::new();
        for i in 0..5 {
            items.push(LaunchpadItem::App(app(&format!("Dev{i}"), &["dev-tools"])));
        }
        for i in 0..15 {
            items.push(LaunchpadItem::App(app(&format!("Plain{i}"), &[])));
        }
        items.push(folder_item("f1", "Tools", vec![app("Inner", &["dev-tools"])]));
        items.push(folder_item("f2", "Misc", vec![app("Other", &[])]));

        let visible = visible_items(&items, "", Some("dev-tools"));
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|i| i.as_folder().is_none()));
    }

    #[test]
    fn search_matches_apps_directly_and_folders_through_children() {
        let items = vec![
            LaunchpadItem::App(app("Calculator", &[])),
            folder_item("f1", "Utilities", vec![app("Calendar", &[])]),
            folder_item("f2", "System", vec![app("Console", &[])]),
        ];
        let visible = visible_items(&items, "cal", None);
        let names: Vec<&str> = visible.iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["Calculator", "Utilities"]);
    }

    #[test]
    fn search_matches_folder_by_own_name() {
        let items = vec![folder_item("f1", "Calculators", vec![app("Zip", &[])])];
        assert_eq!(visible_items(&items, "CAL", None).len(), 1);
    }

    #[test]
    fn tag_and_search_compose_by_intersection() {
        let items = vec![
            LaunchpadItem::App(app("Calculator", &["utilities"])),
            LaunchpadItem::App(app("Calendar", &["planning"])),
            LaunchpadItem::App(app("Console", &["utilities"])),
        ];
        let visible = visible_items(&items, "cal", Some("utilities"));
        let names: Vec<&str> = visible.iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["Calculator"]);
    }

    #[test]
    fn zero_count_predefined_tags_hide_but_custom_tags_stay() {
        let apps = vec![app("Code", &["dev-tools"])];
        let chips = tag_bar_chips(&apps, &[custom("work", "Work")]);

        let keys: Vec<&str> = chips.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["dev-tools", "work"]);
        assert_eq!(chips[0].count, 1);
        assert_eq!(chips[1].count, 0);
        assert!(chips[1].custom);
    }

    #[test]
    fn custom_tags_dedupe_by_key_last_wins() {
        let tags = vec![
            custom("work", "Work"),
            custom("play", "Play"),
            custom("work", "Work 2"),
        ];
        let deduped = dedupe_custom_tags(tags);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].label, "Play");
        assert_eq!(deduped[1].label, "Work 2");
    }

    #[test]
    fn stored_assignments_survive_rescan_even_when_empty() {
        let mut assignments = HashMap::new();
        assignments.insert("com.test.mail".to_string(), vec!["social".to_string()]);
        // Explicitly cleared by the user, distinct from "never set".
        assignments.insert("com.test.code".to_string(), Vec::new());

        // Scanner re-detects tags on every pass.
        let mut apps = vec![app("Mail", &["office"]), app("Code", &["dev-tools"]), app("New", &["browsers"])];
        apply_tag_assignments(&mut apps, &assignments, true);

        assert_eq!(apps[0].tags, vec!["social"]);
        assert!(apps[1].tags.is_empty());
        // No stored entry: detected tags stick when auto-tagging is on.
        assert_eq!(apps[2].tags, vec!["browsers"]);
        // The assignments map itself is untouched by a reload.
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn auto_tag_off_leaves_unassigned_apps_untagged() {
        let mut apps = vec![app("New", &["browsers"])];
        apply_tag_assignments(&mut apps, &HashMap::new(), false);
        assert!(apps[0].tags.is_empty());
    }
}
