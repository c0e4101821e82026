use std::sync::Mutex;

use super::store::HistoryStore;
use super::types::{HistoryEntry, HistoryFile, UndoSummary};
use super::writer::HistoryError;

/// In-process history, for embedding callers and tests
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    history: Mutex<HistoryFile>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut HistoryFile) -> T) -> T {
        let mut guard = self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.with(|history| history.push_capped(entry));
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.with(|history| history.entries.clone()))
    }

    fn mark_undone(&self, id: &str, summary: UndoSummary) -> Result<(), HistoryError> {
        self.with(|history| history.mark_undone(id, summary))
    }
}
