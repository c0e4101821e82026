use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::types::HistoryFile;

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to access history file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("History file is corrupted: {0}")]
    Corrupted(String),

    #[error("History file version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("No history entry with id {0}")]
    EntryNotFound(String),

    #[error("History entry {0} was already undone")]
    AlreadyUndone(String),
}

/// Replace the history file at `path` with `history`.
///
/// Writes a sibling temp file first and renames it into place.
pub fn write_history_file(history: &HistoryFile, path: &Path) -> Result<(), HistoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, history)?;
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;

    debug!(path = ?path, entries = history.entries.len(), "History written");

    Ok(())
}
