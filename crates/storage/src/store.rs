//! Player store implementations

use crate::{PlayerRecord, Result};
use gridhunt_core::PlayerName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable storage for player records
///
/// # Thread Safety
/// Implementations are shared by every connection task and must serialise
/// their own file access.
pub trait PlayerStore: Send + Sync {
    /// Save `records`, replacing any stored record with the same name and
    /// keeping the records of everyone else
    fn store(&self, records: &[PlayerRecord]) -> Result<()>;

    /// Look up the stored record for `name` (case-insensitive)
    fn load(&self, name: &PlayerName) -> Result<Option<PlayerRecord>>;
}

/// CSV-backed player store
///
/// # File Format
/// One record per line:
/// ```text
/// Ann,3,4,120
/// Bob,1,1,0
/// ```
///
/// The whole file is read and rewritten on every `store`. The rewrite goes
/// through a sibling temp file and a rename so a crash never leaves a
/// half-written file behind.
pub struct CsvPlayerStore {
    path: PathBuf,
    io_lock: Mutex<()>,
}

impl CsvPlayerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every well-formed record; a missing file reads as empty
    fn read_all(&self) -> Result<Vec<PlayerRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match PlayerRecord::from_csv(line, i + 1) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping record in {:?}: {}", self.path, e),
            }
        }
        Ok(records)
    }
}

impl PlayerStore for CsvPlayerStore {
    fn store(&self, records: &[PlayerRecord]) -> Result<()> {
        let _guard = self.io_lock.lock();

        let mut merged = self.read_all()?;
        for record in records {
            match merged.iter_mut().find(|existing| existing.name == record.name) {
                Some(existing) => *existing = record.clone(),
                None => merged.push(record.clone()),
            }
        }

        let mut content = String::new();
        for record in &merged {
            content.push_str(&record.to_csv());
            content.push('\n');
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Stored {} player records to {:?}", merged.len(), self.path);
        Ok(())
    }

    fn load(&self, name: &PlayerName) -> Result<Option<PlayerRecord>> {
        let _guard = self.io_lock.lock();
        Ok(self.read_all()?.into_iter().find(|record| record.name == *name))
    }
}

/// In-memory player store, used when no players file is configured
#[derive(Default)]
pub struct MemoryPlayerStore {
    records: Mutex<HashMap<PlayerName, PlayerRecord>>,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn store(&self, records: &[PlayerRecord]) -> Result<()> {
        let mut stored = self.records.lock();
        for record in records {
            stored.insert(record.name.clone(), record.clone());
        }
        Ok(())
    }

    fn load(&self, name: &PlayerName) -> Result<Option<PlayerRecord>> {
        Ok(self.records.lock().get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridhunt_core::Position;

    fn record(name: &str, x: i32, y: i32, score: u64) -> PlayerRecord {
        PlayerRecord::new(PlayerName::from(name), Position::new(x, y), score)
    }

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlayerStore::new(dir.path().join("players.csv"));
        assert_eq!(store.load(&PlayerName::from("Ann")).unwrap(), None);
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlayerStore::new(dir.path().join("players.csv"));

        store.store(&[record("Ann", 1, 2, 30), record("Bob", 3, 4, 0)]).unwrap();

        let ann = store.load(&PlayerName::from("ANN")).unwrap().unwrap();
        assert_eq!(ann.position, Position::new(1, 2));
        assert_eq!(ann.score, 30);

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "Ann,1,2,30\nBob,3,4,0\n");
    }

    #[test]
    fn test_store_merges_with_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlayerStore::new(dir.path().join("players.csv"));

        store.store(&[record("Ann", 1, 1, 10), record("Bob", 2, 2, 20)]).unwrap();
        store.store(&[record("ann", 5, 5, 50)]).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "ann,5,5,50\nBob,2,2,20\n");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        fs::write(&path, "garbage\nAnn,1,1,10\n\n").unwrap();

        let store = CsvPlayerStore::new(&path);
        assert!(store.load(&PlayerName::from("Ann")).unwrap().is_some());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPlayerStore::new();
        assert!(store.is_empty());
        store.store(&[record("Ann", 1, 1, 10)]).unwrap();
        store.store(&[record("ANN", 2, 2, 20)]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&PlayerName::from("ann")).unwrap().unwrap().score, 20);
    }
}
