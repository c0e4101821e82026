use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use super::reader::read_history_file;
use super::types::{HistoryEntry, HistoryFile, UndoSummary};
use super::writer::{write_history_file, HistoryError};

/// Append-only log of executed batches
pub trait HistoryStore {
    /// Record a new batch, evicting the oldest beyond the cap
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// All recorded batches, oldest first
    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Flip a `done` batch to `undone` and attach the undo counters
    fn mark_undone(&self, id: &str, summary: UndoSummary) -> Result<(), HistoryError>;

    /// Newest `done` batch with at least one operation
    fn last_undoable(&self) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.entries()?.into_iter().rev().find(|e| e.is_undoable()))
    }

    fn find(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.entries()?.into_iter().find(|e| e.id == id))
    }
}

/// History kept in a single JSON file.
///
/// Every read-modify-write cycle holds the store's lock, so one store
/// instance is the single writer for its file.
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded data is (), a panic while holding it leaves nothing half-updated
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update<F>(&self, change: F) -> Result<(), HistoryError>
    where
        F: FnOnce(&mut HistoryFile) -> Result<(), HistoryError>,
    {
        let _guard = self.guard();
        let mut history = read_history_file(&self.path)?;
        change(&mut history)?;
        write_history_file(&history, &self.path)
    }
}

impl HistoryStore for JsonHistoryStore {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let id = entry.id.clone();
        let ops = entry.ops.len();
        self.update(|history| {
            history.push_capped(entry);
            Ok(())
        })?;
        info!(id = %id, ops, path = ?self.path, "History entry recorded");
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let _guard = self.guard();
        let history = read_history_file(&self.path)?;
        debug!(path = ?self.path, entries = history.entries.len(), "History loaded");
        Ok(history.entries)
    }

    fn mark_undone(&self, id: &str, summary: UndoSummary) -> Result<(), HistoryError> {
        self.update(|history| history.mark_undone(id, summary))?;
        info!(id = %id, "History entry marked undone");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::tests::entry_with_ops;
    use crate::history::{EntryStatus, MAX_HISTORY_ENTRIES};
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_append_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let entry = entry_with_ops(2);
        let id = entry.id.clone();

        JsonHistoryStore::new(&path).append(entry).unwrap();

        let reopened = JsonHistoryStore::new(&path);
        let entries = reopened.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(reopened.last_undoable().unwrap().map(|e| e.id), Some(id));
    }

    #[test]
    fn test_cap_evicts_first_entry() {
        let dir = tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        let mut ids = Vec::new();
        for _ in 0..=MAX_HISTORY_ENTRIES {
            let entry = entry_with_ops(1);
            ids.push(entry.id.clone());
            store.append(entry).unwrap();
        }

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), MAX_HISTORY_ENTRIES);
        assert!(store.find(&ids[0]).unwrap().is_none());
        assert_eq!(entries.last().map(|e| e.id.clone()), ids.last().cloned());
    }

    #[test]
    fn test_mark_undone_persists() {
        let dir = tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        let entry = entry_with_ops(1);
        let id = entry.id.clone();
        store.append(entry).unwrap();

        let summary = UndoSummary {
            restored: 1,
            total: 1,
            ..UndoSummary::default()
        };
        store.mark_undone(&id, summary).unwrap();

        let found = store.find(&id).unwrap().unwrap();
        assert_eq!(found.status, EntryStatus::Undone);
        assert_eq!(found.undo_summary, Some(summary));
        assert!(store.last_undoable().unwrap().is_none());
    }

    #[test]
    fn test_corrupted_file_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ broken").unwrap();

        let store = JsonHistoryStore::new(&path);
        assert!(matches!(store.entries(), Err(HistoryError::Corrupted(_))));
        assert!(store.append(entry_with_ops(1)).is_err());
        // A failed append must not overwrite what was there
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
    }

    #[test]
    fn test_concurrent_appends_are_serialized() {
        let dir = tempdir().unwrap();
        let store = Arc::new(JsonHistoryStore::new(dir.path().join("history.json")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.append(entry_with_ops(1)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.entries().unwrap().len(), 8);
    }
}
