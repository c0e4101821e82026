use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use super::conflict::DirectoryState;
use super::types::{ItemStatus, PlanItem, RenameOptions, RenamePlan};
use crate::cancel::CancelToken;
use crate::date_source::DateResolver;
use crate::naming::{conflict_suffix, file_name_of, has_date_prefix, prefixed_name, utf8_file_name};
use crate::scanner::{scan_target, ScannerError};

/// Lists the names present in a directory
pub trait DirectoryLister {
    fn list_names(&self, dir: &Path) -> io::Result<Vec<String>>;
}

/// Reads directory listings from the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
            .collect()
    }
}

/// Turns a target and options into a [`RenamePlan`]
pub struct PlanBuilder {
    resolver: DateResolver,
    lister: Box<dyn DirectoryLister>,
}

impl PlanBuilder {
    pub fn new(resolver: DateResolver) -> Self {
        Self {
            resolver,
            lister: Box::new(FsLister),
        }
    }

    pub fn with_lister(mut self, lister: Box<dyn DirectoryLister>) -> Self {
        self.lister = lister;
        self
    }

    /// Build a plan for `target`.
    ///
    /// Only an unreadable target fails; every per-file problem ends up in the
    /// plan as an `Error` item or a scan error. On cancellation the partial
    /// plan is returned with `cancelled` set.
    pub fn build(
        &self,
        target: &Path,
        options: &RenameOptions,
        cancel: &CancelToken,
    ) -> Result<RenamePlan, ScannerError> {
        info!(target = ?target, source = options.date_source.label(), "Building rename plan");

        let scan = scan_target(target, options.recursive, cancel)?;

        let mut plan = RenamePlan {
            target: target.to_path_buf(),
            is_single_file: scan.is_single_file,
            options: options.clone(),
            scanned: scan.files.len(),
            scan_errors: scan.errors,
            ..RenamePlan::default()
        };

        if scan.cancelled {
            plan.cancelled = true;
            return Ok(plan);
        }

        let filter = options.name_filter();
        let mut kept = Vec::with_capacity(scan.files.len());

        for path in scan.files {
            if cancel.is_cancelled() {
                plan.cancelled = true;
                return Ok(plan);
            }

            if filter.matches(&file_name_of(&path)) {
                kept.push(path);
            } else {
                plan.filtered_out += 1;
            }
        }
        plan.matched = kept.len();

        if filter.is_active() {
            debug!(
                scanned = plan.scanned,
                matched = plan.matched,
                filtered = plan.filtered_out,
                "Filter applied"
            );
        }

        let mut directories: HashMap<PathBuf, DirectoryState> = HashMap::new();

        for path in kept {
            if cancel.is_cancelled() {
                info!(planned = plan.items.len(), "Planning cancelled");
                plan.cancelled = true;
                return Ok(plan);
            }

            let item = self.plan_item(path, options, &mut directories, &mut plan.scan_errors);
            trace!(name = %item.original_name, status = ?item.status, final_name = %item.final_name, "Planned");
            plan.items.push(item);
        }

        info!(
            items = plan.items.len(),
            renames = plan.rename_count(),
            conflicts = plan.conflict_count(),
            "Plan ready"
        );

        Ok(plan)
    }

    fn plan_item(
        &self,
        path: PathBuf,
        options: &RenameOptions,
        directories: &mut HashMap<PathBuf, DirectoryState>,
        scan_errors: &mut Vec<String>,
    ) -> PlanItem {
        // Renaming through a lossy name would rewrite the bytes on disk
        let Some(original) = utf8_file_name(&path).map(str::to_string) else {
            warn!(path = ?path, "File name is not valid UTF-8, leaving it alone");
            let lossy = file_name_of(&path);
            return PlanItem::failed(path, lossy, "file name is not valid UTF-8");
        };

        if has_date_prefix(&original) {
            return PlanItem::unchanged(path, original, ItemStatus::SkipPrefix, "Skip: already has date prefix");
        }

        let resolution = self.resolver.resolve(&path, options.date_source);
        let Some(date) = resolution.date else {
            return PlanItem::failed(path, original, "stat() failed");
        };

        let base_name = prefixed_name(date, &original);
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let state = directories
            .entry(parent)
            .or_insert_with_key(|dir| self.snapshot(dir, scan_errors));

        let (final_name, index) = match state.resolve(&base_name) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(name = %original, error = %e, "Conflict resolution failed");
                let mut item = PlanItem::failed(path, original, e.to_string());
                item.base_name = Some(base_name);
                item.note = resolution.note;
                return item;
            }
        };

        state.commit(&original, &final_name);

        let mut parts = vec![format!("Date prefix ({})", options.date_source.label())];
        if resolution.note.is_some() {
            parts.push("metadata -> mtime".to_string());
        }
        if index > 0 {
            parts.push(format!("Auto index {}", conflict_suffix(index)));
        }

        PlanItem {
            path,
            original_name: original,
            base_name: Some(base_name),
            final_name,
            status: ItemStatus::Rename,
            conflict_index: index,
            date_source_used: resolution.source_used,
            note: resolution.note,
            summary: parts.join(" + "),
            error: None,
        }
    }

    fn snapshot(&self, dir: &Path, scan_errors: &mut Vec<String>) -> DirectoryState {
        match self.lister.list_names(dir) {
            Ok(names) => DirectoryState::from_names(names),
            Err(e) => {
                warn!(dir = ?dir, error = %e, "Cannot list directory, assuming empty");
                scan_errors.push(format!("listdir {}: {}", dir.display(), e));
                DirectoryState::default()
            }
        }
    }
}

impl std::fmt::Debug for PlanBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanBuilder").field("resolver", &self.resolver).finish()
    }
}
