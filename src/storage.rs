//! Persistence seam: a string key-value store.
//!
//! The engine reads and writes whole JSON collections through this trait.
//! A browser build backs it with localStorage; tests and native embedders
//! use the stores here. Absence of a key is not an error, it just means
//! the schedule has never been saved.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ScheduleResult;

/// Logical keys the schedule persists under.
pub mod keys {
    pub const COURSES: &str = "schedule-courses";
    pub const STUDY_BLOCKS: &str = "schedule-study-blocks";
    pub const IMPORTANT_DATES: &str = "schedule-important-dates";
    pub const METADATA: &str = "schedule-metadata";
    /// Combined backup document of everything above.
    pub const SNAPSHOT: &str = "schedule-snapshot";
}

/// Durable string key-value storage.
///
/// Mirrors the browser storage contract: `get` returns None for missing
/// keys, and any operation may fail (quota, I/O), which callers surface
/// instead of swallowing.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> ScheduleResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> ScheduleResult<()>;
    fn remove(&mut self, key: &str) -> ScheduleResult<()>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ScheduleResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> ScheduleResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ScheduleResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-per-key store rooted at a directory.
///
/// Writes land in a `.tmp` sibling first and get renamed into place, so a
/// crash mid-write never leaves a torn value behind.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> ScheduleResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ScheduleResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> ScheduleResult<()> {
        let path = self.path_for(key);
        let temp_path = self.dir.join(format!("{}.tmp", key));
        std::fs::write(&temp_path, value)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ScheduleResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("schedule-courses", "[]").unwrap();
        assert_eq!(store.get("schedule-courses").unwrap().as_deref(), Some("[]"));

        store.set("schedule-courses", "[1]").unwrap();
        assert_eq!(store.get("schedule-courses").unwrap().as_deref(), Some("[1]"));

        store.remove("schedule-courses").unwrap();
        assert_eq!(store.get("schedule-courses").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_missing_is_ok() {
        let mut store = MemoryStore::new();
        assert!(store.remove("never-set").is_ok());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("schedule-metadata").unwrap(), None);

        store.set("schedule-metadata", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("schedule-metadata").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        // overwrite through the tmp+rename path
        store.set("schedule-metadata", "{\"a\":2}").unwrap();
        assert_eq!(
            store.get("schedule-metadata").unwrap().as_deref(),
            Some("{\"a\":2}")
        );

        store.remove("schedule-metadata").unwrap();
        assert_eq!(store.get("schedule-metadata").unwrap(), None);
    }

    #[test]
    fn test_file_store_leaves_no_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("schedule-courses", "[]").unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["schedule-courses"], "tmp file must be renamed away");
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("schedule");
        let mut store = FileStore::open(&nested).unwrap();
        store.set("schedule-courses", "[]").unwrap();
        assert!(nested.join("schedule-courses").exists());
    }
}
