use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::EmsError;

// Partition names keep the legacy `ems_*` storage keys.
pub const USERS_PARTITION: &str = "ems_users";
pub const SESSION_PARTITION: &str = "ems_current_user";
pub const ATTENDANCE_PARTITION: &str = "ems_attendance";
pub const TIMEOFF_PARTITION: &str = "ems_timeoff";

/// Named-partition persistence. Each partition is one JSON document that is
/// read and written wholesale; there are no incremental updates.
pub trait Storage: Send + Sync {
    fn read(&self, partition: &str) -> Result<Option<String>, EmsError>;
    fn write(&self, partition: &str, payload: &str) -> Result<(), EmsError>;
    fn remove(&self, partition: &str) -> Result<(), EmsError>;
}

/// One `<partition>.json` file per partition under the configured data dir.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, partition: &str) -> PathBuf {
        self.root.join(format!("{partition}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, partition: &str) -> Result<Option<String>, EmsError> {
        match fs::read_to_string(self.path_for(partition)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EmsError::Persistence(format!("read {partition}: {e}"))),
        }
    }

    fn write(&self, partition: &str, payload: &str) -> Result<(), EmsError> {
        fs::create_dir_all(&self.root)
            .map_err(|e| EmsError::Persistence(format!("create {}: {e}", self.root.display())))?;
        fs::write(self.path_for(partition), payload)
            .map_err(|e| EmsError::Persistence(format!("write {partition}: {e}")))
    }

    fn remove(&self, partition: &str) -> Result<(), EmsError> {
        match fs::remove_file(self.path_for(partition)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EmsError::Persistence(format!("remove {partition}: {e}"))),
        }
    }
}

/// In-memory fake for tests.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn read(&self, partition: &str) -> Result<Option<String>, EmsError> {
        Ok(self
            .entries
            .read()
            .expect("memory storage poisoned")
            .get(partition)
            .cloned())
    }

    fn write(&self, partition: &str, payload: &str) -> Result<(), EmsError> {
        self.entries
            .write()
            .expect("memory storage poisoned")
            .insert(partition.to_owned(), payload.to_owned());
        Ok(())
    }

    fn remove(&self, partition: &str) -> Result<(), EmsError> {
        self.entries
            .write()
            .expect("memory storage poisoned")
            .remove(partition);
        Ok(())
    }
}

/// Read a partition into its typed form. Missing or corrupted documents
/// degrade to the partition default; only I/O failures are errors.
pub fn read_partition<T>(storage: &dyn Storage, partition: &str) -> Result<T, EmsError>
where
    T: DeserializeOwned + Default,
{
    match storage.read(partition)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(partition, error = %e, "Corrupted partition, falling back to default");
                Ok(T::default())
            }
        },
        None => Ok(T::default()),
    }
}

pub fn write_partition<T>(storage: &dyn Storage, partition: &str, value: &T) -> Result<(), EmsError>
where
    T: Serialize,
{
    let raw = serde_json::to_string(value)
        .map_err(|e| EmsError::Persistence(format!("serialize {partition}: {e}")))?;
    storage.write(partition, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_partition_reads_as_default() {
        let storage = MemoryStorage::default();
        let value: Vec<String> = read_partition(&storage, USERS_PARTITION).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn corrupted_partition_degrades_to_default() {
        let storage = MemoryStorage::default();
        storage.write(TIMEOFF_PARTITION, "{not json").unwrap();
        let value: Vec<i64> = read_partition(&storage, TIMEOFF_PARTITION).unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn file_storage_round_trips_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        write_partition(&storage, USERS_PARTITION, &vec!["a".to_string(), "b".to_string()])
            .unwrap();
        let back: Vec<String> = read_partition(&storage, USERS_PARTITION).unwrap();
        assert_eq!(back, vec!["a".to_string(), "b".to_string()]);

        storage.remove(USERS_PARTITION).unwrap();
        assert!(storage.read(USERS_PARTITION).unwrap().is_none());
        // Removing a partition that is already gone is not an error.
        storage.remove(USERS_PARTITION).unwrap();
    }
}
