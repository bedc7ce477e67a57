//! Configuration store interface.
//!
//! The persistent settings backend is an external collaborator organized by
//! (section, key) string pairs; the console treats it as an opaque key/value
//! store. Booleans are stored as `"yes"`/`"no"`. Map-valued parameters (for
//! example wifi SSID → passphrase tables) are read as snapshots and written
//! back as complete replacement maps in one [`ConfigStore::save_param`] call,
//! so an interrupted save can never expose a half-updated table.

use std::collections::BTreeMap;
use std::sync::Mutex;

use log::info;
use thiserror::Error;

/// Map-valued parameter content, keyed and iterated in key order.
pub type ParamMap = BTreeMap<String, String>;

/// Errors surfaced by a configuration backend.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// External persistent key/value settings backend.
pub trait ConfigStore: Send + Sync {
    /// Read one value, `None` when unset.
    fn get(&self, section: &str, key: &str) -> Option<String>;

    /// Write one value.
    fn set(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Remove one value; removing an absent value is not an error.
    fn delete(&self, section: &str, key: &str) -> Result<(), ConfigError>;

    /// Snapshot of a map-valued parameter (the cached parameter object's
    /// backing map).
    fn cached_param(&self, name: &str) -> ParamMap;

    /// Replace a map-valued parameter wholesale. Updates are all-or-nothing:
    /// callers build the complete replacement map first, then commit it here.
    fn save_param(&self, name: &str, map: ParamMap) -> Result<(), ConfigError>;

    fn get_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or_else(|| default.to_string())
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get(section, key) {
            Some(value) => value == "yes",
            None => default,
        }
    }

    fn set_bool(&self, section: &str, key: &str, value: bool) -> Result<(), ConfigError> {
        self.set(section, key, if value { "yes" } else { "no" })
    }
}

/// In-memory store used by tests and the demo binary. Real deployments back
/// this trait with the unit's flash-resident settings partition.
#[derive(Default)]
pub struct MemoryConfigStore {
    sections: Mutex<BTreeMap<String, ParamMap>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections
            .lock()
            .unwrap()
            .get(section)
            .and_then(|m| m.get(key))
            .cloned()
    }

    fn set(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        self.sections
            .lock()
            .unwrap()
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, section: &str, key: &str) -> Result<(), ConfigError> {
        if let Some(map) = self.sections.lock().unwrap().get_mut(section) {
            map.remove(key);
        }
        Ok(())
    }

    fn cached_param(&self, name: &str) -> ParamMap {
        self.sections
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn save_param(&self, name: &str, map: ParamMap) -> Result<(), ConfigError> {
        info!("config: parameter {} replaced ({} entries)", name, map.len());
        self.sections.lock().unwrap().insert(name.to_string(), map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_delete() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get("vehicle", "id"), None);
        store.set("vehicle", "id", "MYCAR01").unwrap();
        assert_eq!(store.get("vehicle", "id").as_deref(), Some("MYCAR01"));
        store.delete("vehicle", "id").unwrap();
        assert_eq!(store.get("vehicle", "id"), None);
        // deleting twice is fine
        store.delete("vehicle", "id").unwrap();
    }

    #[test]
    fn test_bool_convention() {
        let store = MemoryConfigStore::new();
        assert!(store.get_bool("modem", "enable.net", true));
        assert!(!store.get_bool("modem", "enable.gps", false));
        store.set_bool("modem", "enable.gps", true).unwrap();
        assert_eq!(store.get("modem", "enable.gps").as_deref(), Some("yes"));
        store.set_bool("modem", "enable.net", false).unwrap();
        assert!(!store.get_bool("modem", "enable.net", true));
    }

    #[test]
    fn test_param_snapshot_is_detached() {
        let store = MemoryConfigStore::new();
        store.set("wifi.ssid", "Home", "secret1").unwrap();
        let mut snap = store.cached_param("wifi.ssid");
        snap.insert("Guest".into(), "".into());
        // mutating the snapshot does not touch the store
        assert_eq!(store.cached_param("wifi.ssid").len(), 1);
    }

    #[test]
    fn test_save_param_replaces_wholesale() {
        let store = MemoryConfigStore::new();
        store.set("wifi.ssid", "Old", "gone").unwrap();
        let mut map = ParamMap::new();
        map.insert("Home".into(), "secret1".into());
        store.save_param("wifi.ssid", map).unwrap();
        let result = store.cached_param("wifi.ssid");
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Home").map(String::as_str), Some("secret1"));
    }
}
