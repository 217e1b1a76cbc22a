//! JSON file storage backend
//!
//! All keys live in one JSON object on disk:
//!
//! ```json
//! {
//!   "ehr.ui.context.v1": "{\"patientId\":\"pat-1\",\"correlationId\":\"ui-...\"}"
//! }
//! ```
//!
//! Writes go to a temporary file that is then renamed over the target, so a
//! crash mid-write never leaves a truncated file behind. A file that does not
//! parse is treated as empty and replaced on the next write.

use super::traits::ContextStorage;
use crate::domain::{CaredeskError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Key-value store backed by a single JSON file
pub struct JsonFileStorage {
    file_path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    /// Open (or lazily create) the store at `file_path`
    ///
    /// Parent directories are created on the first write.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use caredesk::adapters::storage::{ContextStorage, JsonFileStorage};
    ///
    /// let storage = JsonFileStorage::new(".caredesk/session.json");
    /// storage.save("greeting", "hello")?;
    /// # Ok::<(), caredesk::domain::CaredeskError>(())
    /// ```
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_entries(&self) -> Result<Entries> {
        let contents = match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(CaredeskError::Storage(format!(
                    "Failed to read {}: {e}",
                    self.file_path.display()
                )))
            }
        };

        match serde_json::from_str::<Entries>(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "Storage file is not a JSON string map, treating as empty"
                );
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        Ok(())
    }

    fn modify(&self, apply: impl FnOnce(&mut Entries)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| CaredeskError::Storage(format!("storage lock poisoned: {e}")))?;

        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl ContextStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
