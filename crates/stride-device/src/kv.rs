//! Local persistent key-value storage
//!
//! The cache needs one namespaced slot that survives restarts, the
//! native analogue of browser localStorage. `FileKv` keeps a flat JSON
//! map in the config directory with atomic replacement; `MemoryKv` backs
//! tests.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Minimal persistent string-to-string store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// JSON-file-backed store.
pub struct FileKv {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading local store: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing local store: {}", self.path.display()))
    }

    /// Write to a temp file in the same directory, then rename, so no
    /// concurrent reader observes a partial file.
    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(map).context("serializing local store")?;

        let parent = self.path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        ));
        std::fs::write(&tmp_path, json.as_bytes())
            .with_context(|| format!("writing local store: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("replacing local store: {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryKv {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("store.json"));

        assert_eq!(kv.get("missing").unwrap(), None);

        kv.set("alpha", "one").unwrap();
        kv.set("beta", "two").unwrap();
        assert_eq!(kv.get("alpha").unwrap().as_deref(), Some("one"));

        kv.remove("alpha").unwrap();
        assert_eq!(kv.get("alpha").unwrap(), None);
        assert_eq!(kv.get("beta").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_file_kv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("nested/deeper/store.json"));

        kv.set("key", "value").unwrap();
        assert_eq!(kv.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_kv_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::new(dir.path().join("store.json"));
        kv.set("key", "value").unwrap();

        assert!(!dir.path().join(".store.json.tmp").exists());
    }

    #[test]
    fn test_memory_kv_roundtrip() {
        let kv = MemoryKv::new();
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
        kv.remove("k").unwrap();
        assert_eq!(kv.get("k").unwrap(), None);
    }
}
