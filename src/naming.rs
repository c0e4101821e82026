use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsStr;
use std::path::Path;

// Date prefix: exactly eight ASCII digits and an underscore, e.g. "20240131_"
static DATE_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{8}_").unwrap());

/// Format used for the date stamp written in front of file names
pub const DATE_PREFIX_FORMAT: &str = "%Y%m%d";

/// Whether names on this platform compare case-insensitively
pub const CASE_INSENSITIVE_NAMES: bool = cfg!(any(windows, target_os = "macos"));

/// True when the name already starts with a `YYYYMMDD_` stamp
pub fn has_date_prefix(name: &str) -> bool {
    DATE_PREFIX_REGEX.is_match(name)
}

/// Build `YYYYMMDD_<original>`
pub fn prefixed_name(date: NaiveDate, original: &str) -> String {
    format!("{}_{}", date.format(DATE_PREFIX_FORMAT), original)
}

/// Split a file name into stem and extension (extension keeps its dot).
///
/// Leading dots never start an extension, so ".profile" has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name.rfind('.') {
        Some(idx) if idx >= leading_dots && idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Insert `_NNN` between stem and extension
pub fn with_conflict_suffix(name: &str, index: u16) -> String {
    let (stem, ext) = split_extension(name);
    format!("{}{}{}", stem, conflict_suffix(index), ext)
}

/// The `_NNN` marker for an auto-numbered name
pub fn conflict_suffix(index: u16) -> String {
    format!("_{:03}", index)
}

/// Comparison key for a file name under the platform's case rule
pub fn name_key(name: &str) -> String {
    if CASE_INSENSITIVE_NAMES {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

/// Sort key for a full path under the platform's case rule
pub fn path_key(path: &Path) -> String {
    name_key(&path.to_string_lossy())
}

/// File name of a path, or `None` when it is missing or not valid UTF-8
pub fn utf8_file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(OsStr::to_str)
}

/// File name of a path as an owned string (lossy for non-UTF-8 names)
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
