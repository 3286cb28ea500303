//! Key-value persistence behind a small storage interface.
//!
//! Chat history and the working document are saved per key so the app
//! can restore a session on startup. The interface is injected so
//! tests and the headless harness run against an in-memory store.

use std::collections::HashMap;
use std::path::PathBuf;

pub const KEY_CHAT_HISTORY: &str = "chat_history";
pub const KEY_DOCUMENT: &str = "document";

pub trait Storage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
    fn clear(&mut self, key: &str);
}

/// On-disk storage under the platform data directory, one JSON file
/// per key.
pub struct DiskStorage {
    dir: Option<PathBuf>,
}

impl DiskStorage {
    pub fn new() -> Self {
        let dir = directories::ProjectDirs::from("com", "promptcad", "promptcad")
            .map(|dirs| dirs.data_dir().to_path_buf());
        if dir.is_none() {
            tracing::warn!("no platform data directory, persistence disabled");
        }
        Self { dir }
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{key}.json")))
    }
}

impl Default for DiskStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for DiskStorage {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.path(key)?;
        std::fs::read_to_string(&path).ok()
    }

    fn save(&mut self, key: &str, value: &str) {
        let Some(path) = self.path(key) else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(error) = std::fs::write(&path, value) {
            tracing::warn!(%error, key, "failed to persist");
        }
    }

    fn clear(&mut self, key: &str) {
        if let Some(path) = self.path(key) {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// In-memory storage for tests and the harness.
#[derive(Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn clear(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
