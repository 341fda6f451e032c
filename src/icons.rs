use crate::branding::{PROJECT_APPLICATION, PROJECT_ORGANIZATION, PROJECT_QUALIFIER};
use crate::system::{locate_bundle, BundleInfo};
use eframe::egui;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

const CACHE_MAGIC: &[u8; 4] = b"LPI1";

pub fn icon_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORGANIZATION, PROJECT_APPLICATION)
        .map(|dirs| dirs.cache_dir().join("icons"))
}

fn stable_hash64(input: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in input {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn bundle_mtime_secs(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Cache key covers the bundle's mtime so a replaced app refreshes its icon.
fn cache_path_at(cache_dir: &Path, source_path: &Path, mtime_secs: u64) -> PathBuf {
    let mut input = source_path.to_string_lossy().into_owned().into_bytes();
    input.extend_from_slice(mtime_secs.to_string().as_bytes());
    let key = stable_hash64(&input);
    cache_dir.join(format!("{key:016x}.rgba"))
}

fn load_cached_icon_at(
    cache_dir: &Path,
    source_path: &Path,
    mtime_secs: u64,
) -> Option<egui::ColorImage> {
    let mut file = fs::File::open(cache_path_at(cache_dir, source_path, mtime_secs)).ok()?;

    let mut header = [0u8; 16];
    file.read_exact(&mut header).ok()?;
    if &header[0..4] != CACHE_MAGIC {
        return None;
    }
    let width = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let height = u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;
    let len = u32::from_le_bytes([header[12], header[13], header[14], header[15]]) as usize;
    if len != width.saturating_mul(height).saturating_mul(4) {
        return None;
    }

    let mut pixels = vec![0u8; len];
    file.read_exact(&mut pixels).ok()?;
    Some(egui::ColorImage::from_rgba_unmultiplied(
        [width, height],
        &pixels,
    ))
}

fn save_cached_icon_at(
    cache_dir: &Path,
    source_path: &Path,
    mtime_secs: u64,
    image: &egui::ColorImage,
) {
    if fs::create_dir_all(cache_dir).is_err() {
        return;
    }
    let cache_path = cache_path_at(cache_dir, source_path, mtime_secs);

    let width = image.size[0] as u32;
    let height = image.size[1] as u32;
    let rgba = image.as_raw();

    let mut file = match fs::File::create(cache_path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let mut header = [0u8; 16];
    header[0..4].copy_from_slice(CACHE_MAGIC);
    header[4..8].copy_from_slice(&width.to_le_bytes());
    header[8..12].copy_from_slice(&height.to_le_bytes());
    header[12..16].copy_from_slice(&(rgba.len() as u32).to_le_bytes());
    let _ = file.write_all(&header);
    let _ = file.write_all(rgba);
}

/// Extract an app's icon, consulting the disk cache first. Returns the
/// image at its source resolution; callers resize.
pub fn load_app_icon(app_path: &Path) -> Option<egui::ColorImage> {
    let mtime = bundle_mtime_secs(app_path);
    if let Some(cache_dir) = icon_cache_dir() {
        if let Some(cached) = load_cached_icon_at(&cache_dir, app_path, mtime) {
            return Some(cached);
        }
    }

    let image = extract_bundle_icon(app_path)?;
    if let Some(cache_dir) = icon_cache_dir() {
        save_cached_icon_at(&cache_dir, app_path, mtime, &image);
    }
    Some(image)
}

fn extract_bundle_icon(app_path: &Path) -> Option<egui::ColorImage> {
    let bundle = locate_bundle(app_path)?;
    let value = plist::Value::from_file(&bundle.plist_path).ok()?;
    let dict = value.as_dictionary()?.clone();

    if let Some(icns) = icns_path(&bundle, &dict) {
        if let Some(image) = icns_to_image(&icns) {
            return Some(image);
        }
    }
    if let Some(png) = ios_icon_path(&bundle, &dict) {
        if let Some(image) = png_file_to_image(&png) {
            return Some(image);
        }
    }
    None
}

fn icns_path(bundle: &BundleInfo, dict: &plist::Dictionary) -> Option<PathBuf> {
    let icon_file = dict.get("CFBundleIconFile").and_then(|v| v.as_string())?;
    let resources = bundle.resource_root.join("Contents/Resources");

    let mut path = resources.join(icon_file);
    if path.extension().is_none() {
        path.set_extension("icns");
    }
    if path.exists() {
        return Some(path);
    }
    let bare = resources.join(icon_file);
    bare.exists().then_some(bare)
}

/// iOS-style bundles carry PNG icons at the bundle root, named through
/// CFBundleIcons → CFBundlePrimaryIcon.
fn ios_icon_path(bundle: &BundleInfo, dict: &plist::Dictionary) -> Option<PathBuf> {
    let primary = dict
        .get("CFBundleIcons")
        .and_then(|v| v.as_dictionary())
        .and_then(|icons| icons.get("CFBundlePrimaryIcon"))
        .and_then(|v| v.as_dictionary())?;

    if let Some(files) = primary.get("CFBundleIconFiles").and_then(|v| v.as_array()) {
        for base in files.iter().filter_map(|v| v.as_string()) {
            for suffix in ["@3x.png", "@2x.png", ".png"] {
                let candidate = bundle.resource_root.join(format!("{base}{suffix}"));
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
    }

    let icon_name = primary.get("CFBundleIconName").and_then(|v| v.as_string())?;
    let mut best: Option<(u8, PathBuf)> = None;
    for entry in fs::read_dir(&bundle.resource_root).ok()?.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(icon_name) || !file_name.ends_with(".png") {
            continue;
        }
        let scale = if file_name.contains("@3x") {
            3
        } else if file_name.contains("@2x") {
            2
        } else {
            1
        };
        if best.as_ref().map(|(s, _)| scale > *s).unwrap_or(true) {
            best = Some((scale, path));
        }
    }
    best.map(|(_, path)| path)
}

/// Convert an `.icns` through the macOS `sips` tool and decode the result.
fn icns_to_image(icns_path: &Path) -> Option<egui::ColorImage> {
    let key = stable_hash64(icns_path.to_string_lossy().as_bytes());
    let temp_png = std::env::temp_dir().join(format!(
        "launchpad_icon_{key:016x}_{}.png",
        std::process::id()
    ));

    let output = Command::new("sips")
        .args(["-s", "format", "png"])
        .arg(icns_path)
        .arg("--out")
        .arg(&temp_png)
        .args(["--resampleWidth", "128"])
        .output()
        .ok()?;
    if !output.status.success() {
        let _ = fs::remove_file(&temp_png);
        return None;
    }

    let image = png_file_to_image(&temp_png);
    let _ = fs::remove_file(&temp_png);
    image
}

fn png_file_to_image(path: &Path) -> Option<egui::ColorImage> {
    let bytes = fs::read(path).ok()?;
    decode_png(&bytes)
}

fn decode_png(bytes: &[u8]) -> Option<egui::ColorImage> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png).ok()?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_raw(),
    ))
}

pub fn resize_to_square(image: &egui::ColorImage, side: usize) -> egui::ColorImage {
    let src_w = image.size[0];
    let src_h = image.size[1];
    if src_w == side && src_h == side {
        return image.clone();
    }
    if src_w == 0 || src_h == 0 {
        return image.clone();
    }
    let src = image.as_raw();
    let mut out = vec![0u8; side * side * 4];
    for y in 0..side {
        let sy = y * src_h / side;
        for x in 0..side {
            let sx = x * src_w / side;
            let si = (sy * src_w + sx) * 4;
            let di = (y * side + x) * 4;
            out[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
    }
    egui::ColorImage::from_rgba_unmultiplied([side, side], &out)
}
