use std::{collections::HashMap, fs, path::PathBuf, sync::Mutex};

use serde::{Deserialize, Serialize};

use donasi_core::{errors::Error, storage::KeyValueStore, Result};

const CURRENT_VERSION: u32 = 1;

/// Key-value store persisted as a single JSON file.
///
/// Every write rewrites the whole file; the file is small (a donation id and a
/// session entry). A file that cannot be parsed reads as empty and is replaced
/// on the next write.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Serialize, Deserialize, Default)]
struct StoredValues {
    version: u32,
    values: HashMap<String, String>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn with_values<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&mut HashMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("State file lock poisoned".into()))?;
        let mut values = self.load_locked()?;
        op(&mut values);
        self.persist_locked(values)
    }

    fn read_values(&self) -> Result<HashMap<String, String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::Storage("State file lock poisoned".into()))?;
        self.load_locked()
    }

    fn load_locked(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read(&self.path)?;
        if raw.is_empty() {
            return Ok(HashMap::new());
        }

        match serde_json::from_slice::<StoredValues>(&raw) {
            Ok(stored) => Ok(stored.values),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable state file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn persist_locked(&self, values: HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredValues {
            version: CURRENT_VERSION,
            values,
        };
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self.read_values()?;
        Ok(values.get(key).cloned())
    }

    fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.with_values(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn delete_value(&self, key: &str) -> Result<()> {
        self.with_values(|values| {
            values.remove(key);
        })
    }
}
