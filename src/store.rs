use crate::branding::{PROJECT_APPLICATION, PROJECT_ORGANIZATION, PROJECT_QUALIFIER};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

pub const KEY_ITEM_ORDER: &str = "item-order";
pub const KEY_FOLDERS: &str = "folders";
pub const KEY_TAG_ASSIGNMENTS: &str = "tag-assignments";
pub const KEY_CUSTOM_TAGS: &str = "custom-tags";
pub const KEY_GRID_SETTINGS: &str = "grid-settings";

/// Key-value persistence over one JSON file per key. Reads fall back to
/// the key's default; writes are synchronous and last-write-wins.
pub struct Store {
    dir: Option<PathBuf>,
}

impl Store {
    pub fn open() -> Self {
        let dir = directories::ProjectDirs::from(
            PROJECT_QUALIFIER,
            PROJECT_ORGANIZATION,
            PROJECT_APPLICATION,
        )
        .map(|dirs| dirs.config_dir().join("state"));
        Self { dir }
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    pub fn read<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let Some(path) = self.path_for(key) else {
            return T::default();
        };
        if !path.exists() {
            return T::default();
        }
        match std::fs::File::open(&path) {
            Ok(file) => match serde_json::from_reader(file) {
                Ok(value) => value,
                Err(err) => {
                    warn!("failed to parse {key}: {err}; using default");
                    T::default()
                }
            },
            Err(err) => {
                warn!("failed to open {key}: {err}; using default");
                T::default()
            }
        }
    }

    pub fn write<T>(&self, key: &str, value: &T)
    where
        T: Serialize,
    {
        let Some(path) = self.path_for(key) else {
            return;
        };
        let Some(dir) = path.parent() else {
            return;
        };
        if std::fs::create_dir_all(dir).is_err() {
            warn!("failed to create state directory for {key}");
            return;
        }
        match std::fs::File::create(&path) {
            Ok(file) => {
                if let Err(err) = serde_json::to_writer_pretty(file, value) {
                    warn!("failed to write {key}: {err}");
                }
            }
            Err(err) => warn!("failed to create {key}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_store(tag: &str) -> (Store, PathBuf) {
        let uniq = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time error")
            .as_nanos();
        let base = std::env::temp_dir().join(format!("launchpad_store_test_{tag}_{uniq}"));
        (Store::at(base.clone()), base)
    }

    fn cleanup(base: &Path) {
        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn round_trips_order_map() {
        let (store, base) = temp_store("order");
        let mut order = HashMap::new();
        order.insert("com.test.mail".to_string(), 0i64);
        order.insert("folder-1".to_string(), 1i64);

        store.write(KEY_ITEM_ORDER, &order);
        let loaded: HashMap<String, i64> = store.read(KEY_ITEM_ORDER);
        assert_eq!(loaded, order);

        cleanup(&base);
    }

    #[test]
    fn missing_key_reads_default() {
        let (store, base) = temp_store("missing");
        let loaded: HashMap<String, Vec<String>> = store.read(KEY_TAG_ASSIGNMENTS);
        assert!(loaded.is_empty());
        cleanup(&base);
    }

    #[test]
    fn corrupt_payload_reads_default() {
        let (store, base) = temp_store("corrupt");
        std::fs::create_dir_all(&base).expect("create state dir");
        std::fs::write(base.join("item-order.json"), b"{not json").expect("write corrupt file");

        let loaded: HashMap<String, i64> = store.read(KEY_ITEM_ORDER);
        assert!(loaded.is_empty());

        cleanup(&base);
    }

    #[test]
    fn last_write_wins() {
        let (store, base) = temp_store("rewrite");
        let mut order = HashMap::new();
        order.insert("a".to_string(), 0i64);
        store.write(KEY_ITEM_ORDER, &order);
        order.insert("a".to_string(), 7i64);
        store.write(KEY_ITEM_ORDER, &order);

        let loaded: HashMap<String, i64> = store.read(KEY_ITEM_ORDER);
        assert_eq!(loaded.get("a"), Some(&7));

        cleanup(&base);
    }
}
