use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use super::types::*;
use super::writer::HistoryError;

/// Either the versioned document or a bare list of entries
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHistory {
    Document(HistoryFile),
    Entries(Vec<HistoryEntry>),
}

/// Read and parse the history file; a missing file is an empty history
pub fn read_history_file(path: &Path) -> Result<HistoryFile, HistoryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HistoryFile::default()),
        Err(e) => return Err(HistoryError::Io(e)),
    };

    if content.trim().is_empty() {
        return Ok(HistoryFile::default());
    }

    let history = match serde_json::from_str::<StoredHistory>(&content)
        .map_err(|e| HistoryError::Corrupted(format!("Invalid JSON: {}", e)))?
    {
        StoredHistory::Document(history) => history,
        StoredHistory::Entries(entries) => HistoryFile {
            entries,
            ..HistoryFile::default()
        },
    };

    // Version check
    if history.version != HISTORY_VERSION {
        return Err(HistoryError::VersionMismatch {
            expected: HISTORY_VERSION.to_string(),
            found: history.version,
        });
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::types::tests::entry_with_ops;
    use crate::history::write_history_file;
    use tempfile::tempdir;

    #[test]
    fn test_read_written_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = HistoryFile::default();
        history.push_capped(entry_with_ops(3));

        write_history_file(&history, &path).unwrap();
        let loaded = read_history_file(&path).unwrap();

        assert_eq!(loaded, history);
        assert_eq!(loaded.entries[0].ops.len(), 3);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let loaded = read_history_file(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.entries.is_empty());
        assert_eq!(loaded.version, HISTORY_VERSION);
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "not valid json {{{").unwrap();

        let result = read_history_file(&path);
        assert!(matches!(result, Err(HistoryError::Corrupted(_))));
    }

    #[test]
    fn test_bare_entry_list_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let bare = r#"[{
            "id": "abc",
            "timestamp": "2024-01-01T10:00:00Z",
            "target_path": "/photos",
            "options": { "recursive": false, "dry_run": false, "date_source": "mtime" },
            "ops": [{ "old": "/photos/a.jpg", "new": "/photos/20240101_a.jpg" }],
            "status": "done"
        }]"#;
        fs::write(&path, bare).unwrap();

        let loaded = read_history_file(&path).unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].id, "abc");
        assert!(!loaded.entries[0].cancelled);
    }

    #[test]
    fn test_version_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old-version.json");
        fs::write(&path, r#"{ "version": "99.0", "entries": [] }"#).unwrap();

        let result = read_history_file(&path);
        assert!(matches!(result, Err(HistoryError::VersionMismatch { .. })));
    }
}
