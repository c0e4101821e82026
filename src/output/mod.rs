use crate::execute::ExecutionResult;
use crate::history::{EntryStatus, HistoryEntry};
use crate::plan::{ItemStatus, RenamePlan};
use crate::undo::{UndoOutcome, UndoResult};
use std::io::{self, Write};
use std::time::Duration;

/// Display a plan preview in a formatted output
pub fn display_plan(plan: &RenamePlan, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Target:     {}", plan.target.display())?;
    writeln!(writer, "Source:     {}", plan.options.date_source.label())?;
    writeln!(
        writer,
        "Files:      {} scanned, {} matched, {} filtered out",
        plan.scanned, plan.matched, plan.filtered_out
    )?;
    writeln!(writer)?;

    display_scan_errors(plan, writer)?;

    if plan.items.is_empty() {
        writeln!(writer, "No files to rename.")?;
        return Ok(());
    }

    writeln!(writer, "Planned changes:")?;
    writeln!(writer)?;

    for (i, item) in plan.items.iter().enumerate() {
        match item.status {
            ItemStatus::Rename => {
                writeln!(writer, "  {}. {}", i + 1, item.original_name)?;
                writeln!(writer, "     To:   {}", item.final_name)?;
                writeln!(writer, "     Why:  {}", item.summary)?;
                if let Some(note) = item.note {
                    writeln!(writer, "     [!] {}", note.description())?;
                }
            }
            ItemStatus::SkipPrefix | ItemStatus::SkipFilter => {
                writeln!(writer, "  {}. {} [{}]", i + 1, item.original_name, item.status.label())?;
            }
            ItemStatus::Error => {
                writeln!(writer, "  {}. {} [error]", i + 1, item.original_name)?;
                writeln!(writer, "     [!] {}", item.summary)?;
            }
        }
        writeln!(writer)?;
    }

    // Summary
    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(writer, "  {} files would be renamed", plan.rename_count())?;

    let conflicts = plan.conflict_count();
    if conflicts > 0 {
        writeln!(writer, "  {} names would get an auto index", conflicts)?;
    }
    let skipped = plan.skip_count();
    if skipped > 0 {
        writeln!(writer, "  {} files would be skipped", skipped)?;
    }
    let errors = plan.error_count();
    if errors > 0 {
        writeln!(writer, "  {} files have errors", errors)?;
    }
    if plan.cancelled {
        writeln!(writer, "  Planning was cancelled; this plan is incomplete")?;
    }

    writeln!(writer)?;
    writeln!(writer, "Run without --dry to apply these changes.")?;

    Ok(())
}

/// List only the items that needed an auto-numbered suffix
pub fn display_conflicts(plan: &RenamePlan, writer: &mut impl Write) -> io::Result<()> {
    let conflicts: Vec<_> = plan.conflicts().collect();

    if conflicts.is_empty() {
        writeln!(writer, "No naming conflicts.")?;
        return Ok(());
    }

    writeln!(writer, "{} naming conflicts:", conflicts.len())?;
    writeln!(writer)?;

    for item in conflicts {
        writeln!(writer, "  Folder:   {}", item.folder().display())?;
        writeln!(writer, "  Original: {}", item.original_name)?;
        writeln!(writer, "  Wanted:   {}", item.base_name.as_deref().unwrap_or(""))?;
        writeln!(writer, "  Final:    {}", item.final_name)?;
        writeln!(writer)?;
    }

    Ok(())
}

/// Display the counters of an execution pass
pub fn display_execution_result(result: &ExecutionResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    if result.dry_run {
        writeln!(writer, "Dry run complete. {} files would be renamed.", result.renamed)?;
    } else if result.cancelled {
        writeln!(writer, "Cancelled. Renamed {} files before stopping.", result.renamed)?;
    } else {
        writeln!(writer, "Successfully renamed {} files.", result.renamed)?;
    }

    writeln!(
        writer,
        "  renamed {}, skipped {}, filtered {}, conflicts {}, errors {} (of {}) in {}",
        result.renamed,
        result.skipped,
        result.filtered,
        result.conflicts,
        result.errors,
        result.total,
        format_elapsed(result.elapsed)
    )?;

    for failure in &result.failures {
        writeln!(writer, "  [!] {}: {}", failure.path.display(), failure.error)?;
    }

    if let Some(id) = &result.history_id {
        writeln!(writer, "  Undo with: dateprefix --undo-id {}", id)?;
    }
    if let Some(error) = &result.history_error {
        writeln!(writer, "  [!] History was not recorded: {}", error)?;
    }

    Ok(())
}

pub fn display_undo_outcome(outcome: &UndoOutcome, writer: &mut impl Write) -> io::Result<()> {
    match outcome {
        UndoOutcome::NoHistory => {
            writeln!(writer, "Nothing to undo.")
        }
        UndoOutcome::Completed(result) => display_undo_result(result, writer),
    }
}

pub fn display_undo_result(result: &UndoResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    if result.cancelled {
        writeln!(writer, "Undo cancelled. Restored {} files before stopping.", result.restored)?;
    } else {
        writeln!(writer, "Undo complete. Restored {} files.", result.restored)?;
    }
    writeln!(
        writer,
        "  restored {}, skipped {}, errors {} (of {}) in {}",
        result.restored,
        result.skipped,
        result.errors,
        result.total,
        format_elapsed(result.elapsed)
    )?;

    for skip in &result.skips {
        writeln!(writer, "  [skip] {}: {}", skip.path.display(), skip.reason.description())?;
    }
    if let Some(error) = &result.history_error {
        writeln!(writer, "  [!] History was not updated: {}", error)?;
    }

    Ok(())
}

/// Display recorded batches, newest first
pub fn display_history(entries: &[HistoryEntry], writer: &mut impl Write) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No history recorded.")?;
        return Ok(());
    }

    for entry in entries.iter().rev() {
        let mut flags = String::new();
        if entry.cancelled {
            flags.push_str(" [cancelled]");
        }
        if entry.is_single_file {
            flags.push_str(" [single file]");
        }

        writeln!(
            writer,
            "{}  {}  {:<6}  {} renames  {}{}",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.status.label(),
            entry.ops.len(),
            entry.target_path.display(),
            flags
        )?;

        if entry.status == EntryStatus::Undone {
            if let Some(summary) = &entry.undo_summary {
                writeln!(
                    writer,
                    "    undone: restored {}, skipped {}, errors {}",
                    summary.restored, summary.skipped, summary.errors
                )?;
            }
        }
    }

    Ok(())
}

fn display_scan_errors(plan: &RenamePlan, writer: &mut impl Write) -> io::Result<()> {
    if plan.scan_errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "Could not read {} locations:", plan.scan_errors.len())?;
    for error in plan.scan_errors.iter().take(10) {
        writeln!(writer, "  - {}", error)?;
    }
    if plan.scan_errors.len() > 10 {
        writeln!(writer, "  ... and {} more", plan.scan_errors.len() - 10)?;
    }
    writeln!(writer)?;

    Ok(())
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
