//! Key-value persistence.
//!
//! Every stateful manager keeps its own JSON blob under its own key. Blobs carry a
//! schema `version`; a blob that fails to parse or has the wrong version is treated
//! as absent and the manager starts from defaults.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Synchronous string key-value store (browser `localStorage` or in-memory).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory storage for tests and native builds.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("malformed `{key}` blob: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{key}` blob has schema version {found}, expected {expected}")]
    VersionMismatch {
        key: &'static str,
        found: u32,
        expected: u32,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON blob stored under a fixed key.
pub trait Persisted: Serialize + DeserializeOwned {
    const KEY: &'static str;
    const VERSION: u32;

    /// Schema version recorded in the loaded blob.
    fn version(&self) -> u32;
}

/// Read and validate a blob. `Ok(None)` when nothing is stored.
pub fn load<T: Persisted>(storage: &dyn Storage) -> Result<Option<T>, PersistError> {
    let Some(json) = storage.get(T::KEY) else {
        return Ok(None);
    };
    let value: T = serde_json::from_str(&json)
        .map_err(|source| PersistError::Malformed { key: T::KEY, source })?;
    if value.version() != T::VERSION {
        return Err(PersistError::VersionMismatch {
            key: T::KEY,
            found: value.version(),
            expected: T::VERSION,
        });
    }
    Ok(Some(value))
}

/// Load a blob, falling back to defaults (with a log line) on absence or failure.
pub fn load_or_default<T: Persisted + Default>(storage: &dyn Storage) -> T {
    match load::<T>(storage) {
        Ok(Some(value)) => {
            log::info!("Loaded {}", T::KEY);
            value
        }
        Ok(None) => T::default(),
        Err(err) => {
            log::warn!("{err}; using defaults");
            T::default()
        }
    }
}

pub fn save<T: Persisted>(storage: &mut dyn Storage, value: &T) -> Result<(), PersistError> {
    let json =
        serde_json::to_string(value).map_err(|source| PersistError::Encode { key: T::KEY, source })?;
    storage.set(T::KEY, &json);
    Ok(())
}

/// Save, logging instead of propagating failures.
pub fn save_or_log<T: Persisted>(storage: &mut dyn Storage, value: &T) {
    if let Err(err) = save(storage, value) {
        log::warn!("{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Blob {
        #[serde(default)]
        version: u32,
        count: u32,
    }

    impl Persisted for Blob {
        const KEY: &'static str = "test_blob";
        const VERSION: u32 = 2;

        fn version(&self) -> u32 {
            self.version
        }
    }

    #[test]
    fn round_trip_through_memory_storage() {
        let mut storage = MemoryStorage::new();
        save(&mut storage, &Blob { version: 2, count: 5 }).unwrap();
        let loaded: Blob = load(&storage).unwrap().unwrap();
        assert_eq!(loaded.count, 5);
    }

    #[test]
    fn missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert!(load::<Blob>(&storage).unwrap().is_none());
    }

    #[test]
    fn malformed_json_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.set("test_blob", "{not json");
        assert!(matches!(
            load::<Blob>(&storage),
            Err(PersistError::Malformed { .. })
        ));
        assert_eq!(load_or_default::<Blob>(&storage), Blob::default());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut storage = MemoryStorage::new();
        storage.set("test_blob", r#"{"count":9}"#);
        let err = load::<Blob>(&storage).unwrap_err();
        assert!(matches!(
            err,
            PersistError::VersionMismatch { found: 0, expected: 2, .. }
        ));
    }
}
