use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::fs_ops::{path_present, rename_no_clobber};
use crate::history::{HistoryEntry, HistoryError, HistoryStore, UndoSummary};
use crate::naming::file_name_of;
use crate::progress::Progress;

#[derive(Debug, thiserror::Error)]
pub enum UndoError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Entry cannot be undone: {0}")]
    NotUndoable(String),
}

/// Why an operation was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The renamed file is no longer there
    Missing,
    /// Something already occupies the original name
    Conflict,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::Missing => "renamed file no longer exists",
            SkipReason::Conflict => "original name is taken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSkip {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Counters for one undo pass
#[derive(Debug, Clone, Default)]
pub struct UndoResult {
    pub entry_id: String,
    pub restored: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub skips: Vec<UndoSkip>,
    /// Set when the files were handled but the entry could not be marked undone
    pub history_error: Option<String>,
}

impl UndoResult {
    fn summary(&self) -> UndoSummary {
        UndoSummary {
            restored: self.restored,
            skipped: self.skipped,
            errors: self.errors,
            cancelled: self.cancelled,
            total: self.total,
            elapsed: self.elapsed.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum UndoOutcome {
    /// No `done` batch with operations is recorded
    NoHistory,
    Completed(UndoResult),
}

/// Reverse the most recent batch that has not been undone yet
pub fn undo_last(
    history: &dyn HistoryStore,
    cancel: &CancelToken,
    progress: &mut Progress,
) -> Result<UndoOutcome, UndoError> {
    let Some(entry) = history.last_undoable()? else {
        info!("Nothing to undo");
        return Ok(UndoOutcome::NoHistory);
    };

    Ok(UndoOutcome::Completed(undo(&entry, history, cancel, progress)))
}

/// Reverse a specific batch by id
pub fn undo_entry(
    id: &str,
    history: &dyn HistoryStore,
    cancel: &CancelToken,
    progress: &mut Progress,
) -> Result<UndoResult, UndoError> {
    let entry = history
        .find(id)?
        .ok_or_else(|| UndoError::NotUndoable(format!("no entry with id {}", id)))?;

    if !entry.is_undoable() {
        return Err(UndoError::NotUndoable(format!(
            "{} is {} with {} operations",
            id,
            entry.status.label(),
            entry.ops.len()
        )));
    }

    Ok(undo(&entry, history, cancel, progress))
}

fn undo(
    entry: &HistoryEntry,
    history: &dyn HistoryStore,
    cancel: &CancelToken,
    progress: &mut Progress,
) -> UndoResult {
    let started = Instant::now();
    let total = entry.ops.len();
    let mut result = UndoResult {
        entry_id: entry.id.clone(),
        total,
        ..UndoResult::default()
    };

    info!(id = %entry.id, total, executed_at = %entry.timestamp, "Undoing batch");
    progress.undo_start(total, &entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());

    // Last applied, first restored
    for (i, op) in entry.ops.iter().rev().enumerate() {
        if cancel.is_cancelled() {
            info!(processed = i, total, "Undo cancelled");
            progress.cancelled(i, total);
            result.cancelled = true;
            break;
        }

        let current = file_name_of(&op.new_path);
        let original = file_name_of(&op.old_path);

        let skip = if !path_present(&op.new_path) {
            Some((SkipReason::Missing, &op.new_path))
        } else if path_present(&op.old_path) {
            Some((SkipReason::Conflict, &op.old_path))
        } else {
            None
        };

        if let Some((reason, path)) = skip {
            warn!(path = ?path, reason = reason.description(), "Skipping undo");
            progress.skip(i + 1, total, &current, reason.description());
            result.skipped += 1;
            result.skips.push(UndoSkip {
                path: path.clone(),
                reason,
            });
            continue;
        }

        match rename_no_clobber(&op.new_path, &op.old_path) {
            Ok(()) => {
                info!(from = %current, to = %original, "Restored");
                progress.undo_progress(i + 1, total, &current, &original);
                result.restored += 1;
            }
            Err(e) => {
                warn!(path = ?op.new_path, error = %e, "Restore failed");
                progress.item_error(i + 1, total, &current, &e.to_string());
                result.errors += 1;
            }
        }
    }

    result.elapsed = started.elapsed();

    if let Err(e) = history.mark_undone(&entry.id, result.summary()) {
        error!(id = %entry.id, error = %e, "Failed to mark history entry undone");
        progress.warn(&format!("Failed to update history: {}", e));
        result.history_error = Some(e.to_string());
    }

    info!(
        restored = result.restored,
        skipped = result.skipped,
        errors = result.errors,
        cancelled = result.cancelled,
        "Undo finished"
    );

    result
}
