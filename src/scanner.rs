use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::cancel::CancelToken;
use crate::naming::path_key;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read {path}: {source}")]
    NotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Files found under a target, in stable path order
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    /// Entries or subdirectories that could not be read
    pub errors: Vec<String>,
    pub is_single_file: bool,
    pub cancelled: bool,
}

/// Collect the files a run should consider.
///
/// A file target yields just that file. A directory target yields its direct
/// child files, or every file below it when `recursive` is set. Hidden files
/// are included. Unreadable entries are recorded and skipped; only a target
/// that cannot be read at all is an error.
pub fn scan_target(
    target: &Path,
    recursive: bool,
    cancel: &CancelToken,
) -> Result<ScanResult, ScannerError> {
    debug!(path = ?target, recursive, "Scanning target");

    let target = absolute(target);
    let meta = fs::metadata(&target).map_err(|e| classify(&target, e))?;

    let mut result = if meta.is_file() {
        ScanResult {
            files: vec![target.clone()],
            is_single_file: true,
            ..ScanResult::default()
        }
    } else if recursive {
        scan_recursive(&target, cancel)?
    } else {
        scan_flat(&target, cancel)?
    };

    sort_paths(&mut result.files);

    debug!(
        files = result.files.len(),
        errors = result.errors.len(),
        cancelled = result.cancelled,
        "Scan complete"
    );

    Ok(result)
}

fn scan_flat(dir: &Path, cancel: &CancelToken) -> Result<ScanResult, ScannerError> {
    let mut result = ScanResult::default();

    let read_dir = fs::read_dir(dir).map_err(|e| classify(dir, e))?;

    for entry in read_dir {
        if cancel.is_cancelled() {
            result.cancelled = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "Unreadable directory entry");
                result.errors.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };

        let path = entry.path();
        trace!(entry = ?path, "Examining entry");

        if path.is_file() {
            result.files.push(path);
        }
    }

    Ok(result)
}

fn scan_recursive(root: &Path, cancel: &CancelToken) -> Result<ScanResult, ScannerError> {
    // Fail early the same way a flat scan would if the root itself is unreadable
    fs::read_dir(root).map_err(|e| classify(root, e))?;

    Ok(collect_walk(root, WalkDir::new(root), cancel))
}

fn collect_walk<I>(root: &Path, entries: I, cancel: &CancelToken) -> ScanResult
where
    I: IntoIterator<Item = walkdir::Result<DirEntry>>,
{
    let mut result = ScanResult::default();

    for entry in entries {
        if cancel.is_cancelled() {
            result.cancelled = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let at = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                warn!(path = %at, error = %e, "Skipping unreadable path");
                result.errors.push(format!("{}: {}", at, e));
                continue;
            }
        };

        trace!(entry = ?entry.path(), "Examining entry");

        // Symlinks to files count, as in a flat scan
        if entry.path().is_file() {
            result.files.push(entry.into_path());
        }
    }

    result
}

/// Order paths by their platform comparison key, ties broken by the raw path
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| path_key(a).cmp(&path_key(b)).then_with(|| a.cmp(b)));
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn classify(path: &Path, err: io::Error) -> ScannerError {
    match err.kind() {
        io::ErrorKind::NotFound => ScannerError::PathNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => ScannerError::PermissionDenied(path.to_path_buf()),
        _ => ScannerError::NotReadable {
            path: path.to_path_buf(),
            source: err,
        },
    }
}
