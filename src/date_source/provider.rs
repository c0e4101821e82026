use chrono::{DateTime, Local, NaiveDateTime};
use std::path::Path;

/// Result of asking one metadata reader for a capture timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataOutcome {
    /// Embedded capture time, in local wall-clock time
    Found(NaiveDateTime),
    /// The file was readable but carried no usable timestamp
    Missing,
    /// The file could not be read or is not a format this reader handles
    Unavailable,
}

impl MetadataOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, MetadataOutcome::Found(_))
    }
}

/// A best-effort source of embedded capture times.
///
/// Implementations must never panic and never surface I/O errors; every
/// failure is folded into [`MetadataOutcome::Missing`] or
/// [`MetadataOutcome::Unavailable`].
pub trait MetadataProvider {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn capture_datetime(&self, path: &Path) -> MetadataOutcome;
}

/// Lower-case extension without the dot, if any
pub(crate) fn lower_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Parse the loose ISO-8601 forms found in media container tags.
///
/// Values carrying an offset (or `Z`) are converted to local time; naive
/// values are taken as local already.
pub(crate) fn parse_media_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let rfc3339 = match value.strip_suffix('Z') {
        Some(head) => format!("{}+00:00", head),
        None => value.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&rfc3339) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    let head = value.get(..19).unwrap_or(value);
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(head, fmt).ok())
}
