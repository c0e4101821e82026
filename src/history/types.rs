use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::writer::HistoryError;
use crate::date_source::DateSource;
use crate::plan::RenameOptions;

pub const HISTORY_VERSION: &str = "1.0";

/// Oldest batches are dropped beyond this many
pub const MAX_HISTORY_ENTRIES: usize = 30;

/// On-disk history document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryFile {
    /// Schema version for compatibility
    pub version: String,

    /// Executed batches, oldest first
    pub entries: Vec<HistoryEntry>,
}

impl Default for HistoryFile {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION.to_string(),
            entries: Vec::new(),
        }
    }
}

impl HistoryFile {
    /// Append an entry, evicting the oldest beyond [`MAX_HISTORY_ENTRIES`]
    pub fn push_capped(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    pub fn mark_undone(&mut self, id: &str, summary: UndoSummary) -> Result<(), HistoryError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| HistoryError::EntryNotFound(id.to_string()))?;

        if entry.status == EntryStatus::Undone {
            return Err(HistoryError::AlreadyUndone(id.to_string()));
        }

        entry.status = EntryStatus::Undone;
        entry.undone_at = Some(Utc::now());
        entry.undo_summary = Some(summary);
        Ok(())
    }

    /// Newest entry that can still be undone
    pub fn last_undoable(&self) -> Option<&HistoryEntry> {
        self.entries.iter().rev().find(|e| e.is_undoable())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Done,
    Undone,
}

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Done => "done",
            EntryStatus::Undone => "undone",
        }
    }
}

/// One executed batch of renames
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,

    /// When the batch was executed
    pub timestamp: DateTime<Utc>,

    pub target_path: PathBuf,

    #[serde(default)]
    pub is_single_file: bool,

    pub options: OptionsSnapshot,

    /// Applied renames, in execution order
    pub ops: Vec<OperationRecord>,

    pub status: EntryStatus,

    /// The batch was stopped before every item was processed
    #[serde(default)]
    pub cancelled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undone_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_summary: Option<UndoSummary>,
}

impl HistoryEntry {
    pub fn new(
        target_path: PathBuf,
        is_single_file: bool,
        options: OptionsSnapshot,
        ops: Vec<OperationRecord>,
        cancelled: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            target_path,
            is_single_file,
            options,
            ops,
            status: EntryStatus::Done,
            cancelled,
            undone_at: None,
            undo_summary: None,
        }
    }

    pub fn is_undoable(&self) -> bool {
        self.status == EntryStatus::Done && !self.ops.is_empty()
    }
}

/// One applied rename
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationRecord {
    #[serde(rename = "old")]
    pub old_path: PathBuf,
    #[serde(rename = "new")]
    pub new_path: PathBuf,
}

impl OperationRecord {
    pub fn new(old_path: PathBuf, new_path: PathBuf) -> Self {
        Self { old_path, new_path }
    }
}

/// The options a batch ran with, kept for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OptionsSnapshot {
    pub recursive: bool,
    pub dry_run: bool,
    pub date_source: DateSource,
    #[serde(default)]
    pub filter_exts: String,
    #[serde(default)]
    pub filter_include: String,
    #[serde(default)]
    pub filter_exclude: String,
}

impl OptionsSnapshot {
    pub fn from_options(options: &RenameOptions, dry_run: bool) -> Self {
        Self {
            recursive: options.recursive,
            dry_run,
            date_source: options.date_source,
            filter_exts: options.filter_exts.clone(),
            filter_include: options.filter_include.clone(),
            filter_exclude: options.filter_exclude.clone(),
        }
    }
}

/// Counters recorded when a batch is undone
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct UndoSummary {
    pub restored: usize,
    pub skipped: usize,
    pub errors: usize,
    pub cancelled: bool,
    pub total: usize,
    /// Seconds
    pub elapsed: f64,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn entry_with_ops(count: usize) -> HistoryEntry {
        let ops = (0..count)
            .map(|i| {
                OperationRecord::new(
                    PathBuf::from(format!("/photos/{}.jpg", i)),
                    PathBuf::from(format!("/photos/20240101_{}.jpg", i)),
                )
            })
            .collect();
        HistoryEntry::new(PathBuf::from("/photos"), false, OptionsSnapshot::default(), ops, false)
    }

    #[test]
    fn test_new_entry_is_done_with_hex_id() {
        let entry = entry_with_ops(1);
        assert_eq!(entry.status, EntryStatus::Done);
        assert_eq!(entry.id.len(), 32);
        assert!(entry.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(entry.is_undoable());
    }

    #[test]
    fn test_empty_entry_not_undoable() {
        assert!(!entry_with_ops(0).is_undoable());
    }

    #[test]
    fn test_push_capped_evicts_oldest() {
        let mut file = HistoryFile::default();
        let entries: Vec<HistoryEntry> = (0..=MAX_HISTORY_ENTRIES).map(|_| entry_with_ops(1)).collect();
        let first_id = entries[0].id.clone();
        let second_id = entries[1].id.clone();

        for entry in entries {
            file.push_capped(entry);
        }

        assert_eq!(file.entries.len(), MAX_HISTORY_ENTRIES);
        assert!(file.entries.iter().all(|e| e.id != first_id));
        assert_eq!(file.entries[0].id, second_id);
    }

    #[test]
    fn test_mark_undone_once() {
        let mut file = HistoryFile::default();
        let entry = entry_with_ops(2);
        let id = entry.id.clone();
        file.push_capped(entry);

        file.mark_undone(&id, UndoSummary::default()).unwrap();
        assert_eq!(file.entries[0].status, EntryStatus::Undone);
        assert!(file.entries[0].undone_at.is_some());
        assert!(file.last_undoable().is_none());

        let again = file.mark_undone(&id, UndoSummary::default());
        assert!(matches!(again, Err(HistoryError::AlreadyUndone(_))));
    }

    #[test]
    fn test_mark_unknown_entry() {
        let mut file = HistoryFile::default();
        let result = file.mark_undone("nope", UndoSummary::default());
        assert!(matches!(result, Err(HistoryError::EntryNotFound(_))));
    }

    #[test]
    fn test_last_undoable_skips_undone_and_empty() {
        let mut file = HistoryFile::default();
        let older = entry_with_ops(1);
        let older_id = older.id.clone();
        let undone = entry_with_ops(1);
        let undone_id = undone.id.clone();

        file.push_capped(older);
        file.push_capped(undone);
        file.push_capped(entry_with_ops(0));
        file.mark_undone(&undone_id, UndoSummary::default()).unwrap();

        assert_eq!(file.last_undoable().map(|e| e.id.as_str()), Some(older_id.as_str()));
    }

    #[test]
    fn test_operation_record_field_names() {
        let op = OperationRecord::new(PathBuf::from("/a"), PathBuf::from("/b"));
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"old":"/a","new":"/b"}"#);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&EntryStatus::Done).unwrap(), "\"done\"");
        assert_eq!(serde_json::to_string(&EntryStatus::Undone).unwrap(), "\"undone\"");
    }
}
