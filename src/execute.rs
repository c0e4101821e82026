use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::fs_ops::rename_no_clobber;
use crate::history::{HistoryEntry, HistoryStore, OperationRecord, OptionsSnapshot};
use crate::plan::{ItemStatus, RenamePlan};
use crate::progress::Progress;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("Plan was cancelled while being built and cannot be executed")]
    PlanCancelled,
}

/// A rename that was attempted and failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Counters for one pass over a plan
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub dry_run: bool,
    pub renamed: usize,
    pub skipped: usize,
    /// Files the name filter removed before planning
    pub filtered: usize,
    /// Renamed items that needed an auto-numbered suffix
    pub conflicts: usize,
    pub errors: usize,
    pub total: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    /// Id of the recorded history entry, if one was written
    pub history_id: Option<String>,
    /// Set when the renames happened but recording them failed
    pub history_error: Option<String>,
    pub failures: Vec<ItemFailure>,
}

/// Apply (or with `dry_run`, simulate) every `Rename` item of a plan.
///
/// Per-item failures are counted and the batch keeps going. A real run with
/// at least one applied rename is appended to `history`, even if cancelled
/// part way through.
pub fn execute_plan(
    plan: &RenamePlan,
    dry_run: bool,
    history: &dyn HistoryStore,
    cancel: &CancelToken,
    progress: &mut Progress,
) -> Result<ExecutionResult, ExecuteError> {
    if !plan.is_executable() {
        return Err(ExecuteError::PlanCancelled);
    }

    let started = Instant::now();
    let total = plan.items.len();
    let mut result = ExecutionResult {
        dry_run,
        filtered: plan.filtered_out,
        total,
        ..ExecutionResult::default()
    };
    let mut ops = Vec::new();

    info!(total, dry_run, "Executing rename plan");

    for (i, item) in plan.items.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(processed = i, total, "Execution cancelled");
            progress.cancelled(i, total);
            result.cancelled = true;
            break;
        }

        match item.status {
            ItemStatus::SkipPrefix | ItemStatus::SkipFilter => {
                result.skipped += 1;
                progress.skip(i + 1, total, &item.original_name, &item.summary);
            }
            ItemStatus::Error => {
                result.errors += 1;
                let message = item.error.as_deref().unwrap_or(&item.summary);
                progress.item_error(i + 1, total, &item.original_name, message);
            }
            ItemStatus::Rename if dry_run => {
                result.renamed += 1;
                if item.conflict_index > 0 {
                    result.conflicts += 1;
                }
                progress.rename_progress(i + 1, total, &item.original_name, &item.final_name);
            }
            ItemStatus::Rename => {
                let destination = item.target_path();
                match rename_no_clobber(&item.path, &destination) {
                    Ok(()) => {
                        info!(from = %item.original_name, to = %item.final_name, "Renamed");
                        ops.push(OperationRecord::new(item.path.clone(), destination));
                        result.renamed += 1;
                        if item.conflict_index > 0 {
                            result.conflicts += 1;
                        }
                        progress.rename_progress(i + 1, total, &item.original_name, &item.final_name);
                    }
                    Err(e) => {
                        warn!(path = ?item.path, error = %e, "Rename failed");
                        result.errors += 1;
                        progress.item_error(i + 1, total, &item.original_name, &e.to_string());
                        result.failures.push(ItemFailure {
                            path: item.path.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    if !dry_run && !ops.is_empty() {
        let entry = HistoryEntry::new(
            plan.target.clone(),
            plan.is_single_file,
            OptionsSnapshot::from_options(&plan.options, dry_run),
            ops,
            result.cancelled,
        );
        let id = entry.id.clone();

        match history.append(entry) {
            Ok(()) => {
                progress.history_recorded(&id);
                result.history_id = Some(id);
            }
            Err(e) => {
                error!(error = %e, "Failed to record history; renames were applied");
                progress.warn(&format!("Failed to record history: {}", e));
                result.history_error = Some(e.to_string());
            }
        }
    }

    result.elapsed = started.elapsed();

    info!(
        renamed = result.renamed,
        skipped = result.skipped,
        errors = result.errors,
        conflicts = result.conflicts,
        cancelled = result.cancelled,
        "Execution finished"
    );

    Ok(result)
}
