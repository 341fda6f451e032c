use crate::branding::OWN_BUNDLE_ID;
use crate::model::App;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

struct ScanRoot {
    path: PathBuf,
    source_folder: Option<&'static str>,
    max_depth: usize,
}

fn scan_roots() -> Vec<ScanRoot> {
    let mut roots = vec![
        ScanRoot {
            path: PathBuf::from("/Applications"),
            source_folder: None,
            max_depth: 2,
        },
        ScanRoot {
            path: PathBuf::from("/System/Applications"),
            source_folder: Some("System"),
            max_depth: 1,
        },
        ScanRoot {
            path: PathBuf::from("/System/Applications/Utilities"),
            source_folder: Some("Utilities"),
            max_depth: 1,
        },
        ScanRoot {
            path: PathBuf::from("/Applications/Utilities"),
            source_folder: Some("Utilities"),
            max_depth: 1,
        },
    ];
    if let Some(home) = home::home_dir() {
        roots.push(ScanRoot {
            path: home.join("Applications"),
            source_folder: None,
            max_depth: 2,
        });
    }
    roots
}

/// Directories the install watcher observes.
pub fn watch_roots() -> Vec<PathBuf> {
    scan_roots().into_iter().map(|root| root.path).collect()
}

/// Enumerate installed `.app` bundles across the standard application
/// directories. Icons are not touched here; display must not wait on them.
pub fn scan_installed_apps() -> Result<Vec<App>> {
    let roots = scan_roots();
    if roots.iter().all(|root| !root.path.is_dir()) {
        bail!("no application directories found");
    }

    let mut apps = Vec::new();
    for root in &roots {
        if !root.path.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root.path)
            .max_depth(root.max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("app") {
                if let Some(app) = parse_app_bundle(entry.path(), root.source_folder) {
                    apps.push(app);
                }
            }
        }
    }

    apps.sort_by(|a, b| a.bundle_id.cmp(&b.bundle_id));
    apps.dedup_by(|a, b| a.bundle_id == b.bundle_id);
    apps.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(apps)
}

/// Resolved bundle layout: where the Info.plist lives and which directory
/// actually holds the resources (differs for wrapped iOS ports).
pub struct BundleInfo {
    pub plist_path: PathBuf,
    pub resource_root: PathBuf,
}

/// Locate the Info.plist for a bundle, following the wrapped-iOS layouts
/// (`WrappedBundle` link or `Wrapper/*.app`) used by Mac App Store ports.
pub fn locate_bundle(app_path: &Path) -> Option<BundleInfo> {
    let standard = app_path.join("Contents/Info.plist");
    if standard.exists() {
        return Some(BundleInfo {
            plist_path: standard,
            resource_root: app_path.to_path_buf(),
        });
    }

    let link = app_path.join("WrappedBundle");
    if link.is_symlink() || link.exists() {
        if let Ok(resolved) = fs::read_link(&link) {
            let inner = app_path.join(resolved);
            if let Some(info) = inner_bundle_info(&inner) {
                return Some(info);
            }
        }
    }

    let wrapper = app_path.join("Wrapper");
    if wrapper.is_dir() {
        for entry in fs::read_dir(&wrapper).ok()?.flatten() {
            let inner = entry.path();
            if inner.extension().and_then(|s| s.to_str()) != Some("app") {
                continue;
            }
            if let Some(info) = inner_bundle_info(&inner) {
                return Some(info);
            }
        }
    }

    None
}

fn inner_bundle_info(inner: &Path) -> Option<BundleInfo> {
    let macos_style = inner.join("Contents/Info.plist");
    if macos_style.exists() {
        return Some(BundleInfo {
            plist_path: macos_style,
            resource_root: inner.to_path_buf(),
        });
    }
    // iOS layout keeps Info.plist at the bundle root.
    let ios_style = inner.join("Info.plist");
    if ios_style.exists() {
        return Some(BundleInfo {
            plist_path: ios_style,
            resource_root: inner.to_path_buf(),
        });
    }
    None
}

fn parse_app_bundle(app_path: &Path, source_folder: Option<&str>) -> Option<App> {
    let bundle = locate_bundle(app_path)?;
    let value = plist::Value::from_file(&bundle.plist_path).ok()?;
    let dict = value.as_dictionary()?;

    let name = dict
        .get("CFBundleDisplayName")
        .or_else(|| dict.get("CFBundleName"))
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())?;
    let bundle_id = dict
        .get("CFBundleIdentifier")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
        .unwrap_or_else(|| app_path.to_string_lossy().to_string());

    if bundle_id == OWN_BUNDLE_ID {
        return None;
    }

    let tags = detect_app_tags(dict, &bundle_id, &name);

    Some(App {
        bundle_id,
        name,
        // Outer bundle path: that is what `open` launches.
        path: app_path.to_string_lossy().to_string(),
        source_folder: source_folder.map(|s| s.to_string()),
        tags,
        icon: None,
    })
}

pub fn launch_app(path: &str) -> Result<()> {
    Command::new("open")
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to launch {path}"))?;
    Ok(())
}

pub fn reveal_in_finder(path: &str) -> Result<()> {
    if !cfg!(target_os = "macos") {
        bail!("reveal in Finder is supported only on macOS");
    }
    Command::new("open")
        .arg("-R")
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to reveal {path}"))?;
    Ok(())
}

pub fn move_to_trash(path: &str) -> Result<()> {
    trash::delete(path).with_context(|| format!("failed to move {path} to trash"))
}

/// Category detection, most specific source first: bundle-id patterns,
/// then well-known app names, then the bundle's declared category.
pub fn detect_app_tags(dict: &plist::Dictionary, bundle_id: &str, name: &str) -> Vec<String> {
    if let Some(tag) = detect_tag_from_bundle_id(bundle_id) {
        return vec![tag.to_string()];
    }
    if let Some(tag) = detect_tag_from_app_name(name) {
        return vec![tag.to_string()];
    }
    if let Some(tag) = dict
        .get("LSApplicationCategoryType")
        .and_then(|v| v.as_string())
        .and_then(map_category_to_tag)
    {
        return vec![tag.to_string()];
    }
    Vec::new()
}

fn map_category_to_tag(category: &str) -> Option<&'static str> {
    match category {
        "public.app-category.developer-tools" => Some("dev-tools"),
        "public.app-category.social-networking" => Some("social"),
        "public.app-category.utilities" => Some("utilities"),
        "public.app-category.entertainment"
        | "public.app-category.games"
        | "public.app-category.music"
        | "public.app-category.video" => Some("entertainment"),
        "public.app-category.graphics-design" | "public.app-category.photography" => {
            Some("creativity")
        }
        "public.app-category.productivity"
        | "public.app-category.business"
        | "public.app-category.finance" => Some("planning"),
        "public.app-category.education" | "public.app-category.reference" => Some("office"),
        _ => None,
    }
}

const BROWSER_ID_PATTERNS: &[&str] = &[
    ".safari", "safari.", ".chrome", "chrome.", ".firefox", "mozilla.", "torbrowser",
    "torproject", ".brave", "brave.", ".opera", "opera.", ".vivaldi", ".edge",
    "microsoftedge", ".arc", "company.thebrowser.browser", "waterfox", "librewolf",
];

const OFFICE_ID_PATTERNS: &[&str] = &[
    "google.docs", "google.sheets", "google.slides", "google.gmail", "microsoft.word",
    "microsoft.excel", "microsoft.powerpoint", "microsoft.outlook", "libreoffice",
    "openoffice", "pages", "numbers", "keynote", "notion", "obsidian", "evernote",
    "onenote", "airtable",
];

const UTILITY_ID_PATTERNS: &[&str] = &[
    "rectangle", "magnet", "bettertouchtool", "alfred", "raycast", "cleanmymac",
    "appcleaner", "utm", "virtualbox", "parallels", "bitwarden", "keepass", "bartender",
    "hazel", "maccy", "flux",
];

const SOCIAL_ID_PATTERNS: &[&str] = &[
    "slack", "discord", "telegram", "whatsapp", "messenger", "signal", "zoom", "teams",
    "skype", "facetime", "webex", "twitter", "mastodon", "bluesky", "instagram",
    "facebook", "linkedin", "element", "matrix",
];

const DEV_TOOLS_ID_PATTERNS: &[&str] = &[
    "xcode", "vscode", "jetbrains", "intellij", "pycharm", "webstorm", "github",
    "terminal", "iterm", "warp", "alacritty", "kitty", "docker", "postman", "insomnia",
    "neovim", "macvim", "emacs", "sublime", "sourcetree", "gitkraken", "tableplus",
    "dbeaver", "proxyman", "wireshark",
];

const CREATIVITY_ID_PATTERNS: &[&str] = &[
    "photoshop", "illustrator", "indesign", "premiere", "lightroom", "adobe", "sketch",
    "figma", "affinity", "pixelmator", "inkscape", "gimp", "krita", "blender", "davinci",
    "logic", "garageband", "ableton", "audacity", "canva",
];

const ENTERTAINMENT_ID_PATTERNS: &[&str] = &[
    "spotify", "music", "itunes", "tidal", "soundcloud", "vlc", "iina", "plex", "kodi",
    "infuse", "netflix", "youtube", "steam", "epic", "gog", "minecraft", "twitch", "obs",
];

const PLANNING_ID_PATTERNS: &[&str] = &[
    "calendar", "fantastical", "busycal", "reminders", "todoist", "things", "omnifocus",
    "agenda", "craft", "logseq", "trello", "asana", "clickup", "linear", "toggl",
];

fn detect_tag_from_bundle_id(bundle_id: &str) -> Option<&'static str> {
    let id = bundle_id.to_lowercase();

    // Chrome/Edge PWAs are web apps, not browsers; let later tiers decide.
    if id.contains(".chrome.app.") || id.contains(".edge.app.") {
        return None;
    }

    let tables: [(&[&str], &'static str); 8] = [
        (BROWSER_ID_PATTERNS, "browsers"),
        (OFFICE_ID_PATTERNS, "office"),
        (UTILITY_ID_PATTERNS, "utilities"),
        (SOCIAL_ID_PATTERNS, "social"),
        (DEV_TOOLS_ID_PATTERNS, "dev-tools"),
        (CREATIVITY_ID_PATTERNS, "creativity"),
        (ENTERTAINMENT_ID_PATTERNS, "entertainment"),
        (PLANNING_ID_PATTERNS, "planning"),
    ];
    tables
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| id.contains(p)))
        .map(|(_, tag)| *tag)
}

fn detect_tag_from_app_name(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();

    const BROWSER_NAMES: &[&str] = &[
        "safari", "chrome", "firefox", "edge", "brave", "tor browser", "opera", "arc",
        "orion", "vivaldi",
    ];
    const OFFICE_NAMES: &[&str] = &[
        "google docs", "google sheets", "gmail", "google drive", "microsoft word",
        "microsoft excel", "microsoft powerpoint", "outlook", "pages", "numbers",
        "keynote", "libreoffice", "notion",
    ];
    const UTILITY_NAMES: &[&str] = &[
        "utility", "activity monitor", "console", "disk utility", "finder",
        "system settings", "system preferences", "terminal", "calculator",
    ];
    const SOCIAL_NAMES: &[&str] = &["mail", "facetime", "messages", "slack", "discord", "zoom"];
    const PLANNING_NAMES: &[&str] = &["calendar", "reminders", "notes", "todoist", "things"];
    const CREATIVITY_NAMES: &[&str] = &[
        "photos", "photoshop", "illustrator", "sketch", "figma", "final cut", "logic pro",
    ];

    let tables: [(&[&str], &'static str); 6] = [
        (BROWSER_NAMES, "browsers"),
        (OFFICE_NAMES, "office"),
        (UTILITY_NAMES, "utilities"),
        (SOCIAL_NAMES, "social"),
        (PLANNING_NAMES, "planning"),
        (CREATIVITY_NAMES, "creativity"),
    ];
    tables
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| name.contains(p)))
        .map(|(_, tag)| *tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_dict() -> plist::Dictionary {
        plist::Dictionary::new()
    }

    #[test]
    fn bundle_id_patterns_win_over_everything() {
        let mut dict = empty_dict();
        dict.insert(
            "LSApplicationCategoryType".to_string(),
            plist::Value::String("public.app-category.productivity".to_string()),
        );
        let tags = detect_app_tags(&dict, "org.mozilla.firefox", "Firefox");
        assert_eq!(tags, vec!["browsers"]);
    }

    #[test]
    fn pwa_bundle_ids_are_not_browsers() {
        let tags = detect_app_tags(
            &empty_dict(),
            "com.google.chrome.app.kjgfgldnnfoeklkmfkjfagphfepbbdan",
            "Some Web App",
        );
        assert!(tags.is_empty());
    }

    #[test]
    fn name_tier_catches_well_known_apps() {
        let tags = detect_app_tags(&empty_dict(), "com.apple.systempreferences", "System Settings");
        assert_eq!(tags, vec!["utilities"]);
    }

    #[test]
    fn declared_category_is_the_fallback() {
        let mut dict = empty_dict();
        dict.insert(
            "LSApplicationCategoryType".to_string(),
            plist::Value::String("public.app-category.developer-tools".to_string()),
        );
        let tags = detect_app_tags(&dict, "com.example.unheard-of", "Obscurity");
        assert_eq!(tags, vec!["dev-tools"]);
    }

    #[test]
    fn unknown_apps_stay_untagged() {
        let tags = detect_app_tags(&empty_dict(), "com.example.unheard-of", "Obscurity");
        assert!(tags.is_empty());
    }
}
