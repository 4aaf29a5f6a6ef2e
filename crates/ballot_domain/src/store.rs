use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::{error::PlatformError, reminder::ReminderRecord};

pub const REMINDERS_KEY: &str = "electionReminders";

/// Flat key-value persistence, the shape of platform "user defaults".
pub trait KeyValueStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError>;
    fn save(&self, key: &str, value: &[u8]) -> Result<(), PlatformError>;
    fn remove(&self, key: &str) -> Result<(), PlatformError>;
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), PlatformError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|err| {
            PlatformError::new(format!(
                "unable to prepare storage directory {}: {err}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PlatformError::new(err.to_string())),
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), PlatformError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|err| PlatformError::new(err.to_string()))?;
        fs::rename(&staging, &path).map_err(|err| PlatformError::new(err.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PlatformError::new(err.to_string())),
        }
    }
}

/// The persisted reminder list.
///
/// Every mutation runs its whole read-modify-write cycle under one lock and
/// the in-memory list only changes once storage accepted the new value, so
/// concurrent schedule/cancel calls cannot lose updates.
pub struct ReminderStore {
    storage: Arc<dyn KeyValueStorage>,
    records: Mutex<Vec<ReminderRecord>>,
}

impl ReminderStore {
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        let records = match storage.load(REMINDERS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<ReminderRecord>>(&bytes) {
                Ok(records) => records,
                Err(err) => {
                    warn!(%err, "stored reminders are unreadable; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "unable to load stored reminders; starting empty");
                Vec::new()
            }
        };
        debug!(count = records.len(), "reminder store opened");
        Self {
            storage,
            records: Mutex::new(records),
        }
    }

    pub fn list(&self) -> Vec<ReminderRecord> {
        self.records.lock().clone()
    }

    /// Adds `record` unless an identical tuple is already stored.
    pub fn insert(&self, record: ReminderRecord) -> Result<(), PlatformError> {
        self.mutate(|records| {
            if !records.contains(&record) {
                records.push(record);
            }
        })
    }

    /// Removes every record equal to `record`. Absent records are not an error.
    pub fn remove(&self, record: &ReminderRecord) -> Result<(), PlatformError> {
        self.mutate(|records| records.retain(|existing| existing != record))
    }

    pub fn clear(&self) -> Result<(), PlatformError> {
        let mut guard = self.records.lock();
        self.storage.remove(REMINDERS_KEY)?;
        guard.clear();
        Ok(())
    }

    fn mutate(&self, apply: impl FnOnce(&mut Vec<ReminderRecord>)) -> Result<(), PlatformError> {
        let mut guard = self.records.lock();
        let mut next = guard.clone();
        apply(&mut next);
        if next == *guard {
            return Ok(());
        }
        let encoded = serde_json::to_vec(&next)
            .map_err(|err| PlatformError::new(format!("unable to encode reminders: {err}")))?;
        self.storage.save(REMINDERS_KEY, &encoded)?;
        *guard = next;
        Ok(())
    }
}
