//! Resolving the calendar date a file should be stamped with.
//!
//! The resolver never fails outward: metadata problems become a
//! [`DateNote`] and the date falls back to the file's modification time.

mod exif;
mod provider;
mod video;

pub use self::exif::ExifProvider;
pub use provider::{MetadataOutcome, MetadataProvider};
pub use video::{FfprobeProvider, IsoBmffProvider, VIDEO_EXTENSIONS};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};

/// Which timestamp the date prefix is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum DateSource {
    /// Last modification time
    #[default]
    #[serde(rename = "mtime")]
    #[value(name = "mtime")]
    ModifiedTime,
    /// Creation time (birth time where the platform reports it)
    #[serde(rename = "ctime")]
    #[value(name = "ctime")]
    CreatedTime,
    /// EXIF or video container capture time, falling back to mtime
    #[serde(rename = "capture")]
    #[value(name = "capture")]
    CaptureTime,
}

impl DateSource {
    pub fn label(&self) -> &'static str {
        match self {
            DateSource::ModifiedTime => "mtime",
            DateSource::CreatedTime => "ctime",
            DateSource::CaptureTime => "capture",
        }
    }
}

/// Why a capture-time lookup fell back to the modification time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateNote {
    /// Metadata was readable but had no capture time
    MetadataMissing,
    /// Metadata could not be read at all
    MetadataUnavailable,
}

impl DateNote {
    pub fn description(&self) -> &'static str {
        match self {
            DateNote::MetadataMissing => "capture date missing, used modification time",
            DateNote::MetadataUnavailable => "capture date unavailable, used modification time",
        }
    }
}

/// Outcome of resolving one file's date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub date: Option<NaiveDate>,
    pub note: Option<DateNote>,
    /// The source that actually produced `date`
    pub source_used: Option<DateSource>,
}

/// Resolves dates using the configured source and an ordered provider chain
pub struct DateResolver {
    providers: Vec<Box<dyn MetadataProvider>>,
}

impl DateResolver {
    pub fn new(providers: Vec<Box<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }

    /// EXIF first, then native MP4/MOV headers, then `ffprobe`
    pub fn with_default_providers(ffprobe: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            Box::new(ExifProvider),
            Box::new(IsoBmffProvider),
            Box::new(FfprobeProvider::new(ffprobe)),
        ])
    }

    pub fn resolve(&self, path: &Path, source: DateSource) -> Resolution {
        match source {
            DateSource::ModifiedTime => from_filesystem(modified_date(path), source),
            DateSource::CreatedTime => from_filesystem(created_date(path), source),
            DateSource::CaptureTime => self.resolve_capture(path),
        }
    }

    fn resolve_capture(&self, path: &Path) -> Resolution {
        let mut saw_missing = false;

        for provider in &self.providers {
            match provider.capture_datetime(path) {
                MetadataOutcome::Found(dt) => {
                    trace!(path = ?path, provider = provider.name(), "Capture time found");
                    return Resolution {
                        date: Some(dt.date()),
                        note: None,
                        source_used: Some(DateSource::CaptureTime),
                    };
                }
                MetadataOutcome::Missing => saw_missing = true,
                MetadataOutcome::Unavailable => {}
            }
        }

        let note = if saw_missing {
            DateNote::MetadataMissing
        } else {
            DateNote::MetadataUnavailable
        };
        debug!(path = ?path, note = ?note, "Falling back to modification time");

        let date = modified_date(path);
        Resolution {
            date,
            note: Some(note),
            source_used: date.map(|_| DateSource::ModifiedTime),
        }
    }
}

impl std::fmt::Debug for DateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("DateResolver").field("providers", &names).finish()
    }
}

fn from_filesystem(date: Option<NaiveDate>, source: DateSource) -> Resolution {
    Resolution {
        date,
        note: None,
        source_used: date.map(|_| source),
    }
}

fn local_date(time: SystemTime) -> NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

fn modified_date(path: &Path) -> Option<NaiveDate> {
    let meta = fs::metadata(path).ok()?;
    meta.modified().ok().map(local_date)
}

fn created_date(path: &Path) -> Option<NaiveDate> {
    let meta = fs::metadata(path).ok()?;
    if let Ok(created) = meta.created() {
        return Some(local_date(created));
    }
    status_change_date(&meta)
}

#[cfg(unix)]
fn status_change_date(meta: &fs::Metadata) -> Option<NaiveDate> {
    use chrono::TimeZone;
    use std::os::unix::fs::MetadataExt;

    Local
        .timestamp_opt(meta.ctime(), meta.ctime_nsec() as u32)
        .single()
        .map(|dt| dt.date_naive())
}

#[cfg(not(unix))]
fn status_change_date(_meta: &fs::Metadata) -> Option<NaiveDate> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::tempdir;

    struct Fixed(MetadataOutcome);

    impl MetadataProvider for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn capture_datetime(&self, _path: &Path) -> MetadataOutcome {
            self.0
        }
    }

    fn resolver(outcomes: &[MetadataOutcome]) -> DateResolver {
        DateResolver::new(
            outcomes
                .iter()
                .map(|o| Box::new(Fixed(*o)) as Box<dyn MetadataProvider>)
                .collect(),
        )
    }

    fn mtime_date(path: &Path) -> NaiveDate {
        local_date(fs::metadata(path).unwrap().modified().unwrap())
    }

    #[test]
    fn test_modified_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "x").unwrap();

        let res = resolver(&[]).resolve(&path, DateSource::ModifiedTime);
        assert_eq!(res.date, Some(mtime_date(&path)));
        assert_eq!(res.note, None);
        assert_eq!(res.source_used, Some(DateSource::ModifiedTime));
    }

    #[test]
    fn test_created_time_available() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "x").unwrap();

        let res = resolver(&[]).resolve(&path, DateSource::CreatedTime);
        assert!(res.date.is_some());
        assert_eq!(res.source_used, Some(DateSource::CreatedTime));
    }

    #[test]
    fn test_stat_failure_gives_no_date_no_note() {
        let res = resolver(&[]).resolve(Path::new("/nonexistent/file"), DateSource::ModifiedTime);
        assert_eq!(res, Resolution::default());
    }

    #[test]
    fn test_capture_found_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.jpg");
        fs::write(&path, "x").unwrap();

        let dt = NaiveDateTime::parse_from_str("2001-02-03 04:05:06", "%Y-%m-%d %H:%M:%S").unwrap();
        let res = resolver(&[MetadataOutcome::Unavailable, MetadataOutcome::Found(dt)])
            .resolve(&path, DateSource::CaptureTime);

        assert_eq!(res.date, NaiveDate::from_ymd_opt(2001, 2, 3));
        assert_eq!(res.note, None);
        assert_eq!(res.source_used, Some(DateSource::CaptureTime));
    }

    #[test]
    fn test_capture_missing_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.jpg");
        fs::write(&path, "x").unwrap();

        let res = resolver(&[MetadataOutcome::Missing, MetadataOutcome::Unavailable])
            .resolve(&path, DateSource::CaptureTime);

        assert_eq!(res.date, Some(mtime_date(&path)));
        assert_eq!(res.note, Some(DateNote::MetadataMissing));
        assert_eq!(res.source_used, Some(DateSource::ModifiedTime));
    }

    #[test]
    fn test_capture_unavailable_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "x").unwrap();

        let res = resolver(&[MetadataOutcome::Unavailable]).resolve(&path, DateSource::CaptureTime);

        assert_eq!(res.date, Some(mtime_date(&path)));
        assert_eq!(res.note, Some(DateNote::MetadataUnavailable));
    }

    #[test]
    fn test_capture_on_missing_file_keeps_note() {
        let res = resolver(&[MetadataOutcome::Unavailable])
            .resolve(Path::new("/nonexistent/clip.mp4"), DateSource::CaptureTime);

        assert_eq!(res.date, None);
        assert_eq!(res.note, Some(DateNote::MetadataUnavailable));
        assert_eq!(res.source_used, None);
    }

    #[test]
    fn test_default_chain_reads_real_exif() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tif");
        fs::write(&path, exif::tests::tiff_with_datetime("1999:12:31 23:59:59")).unwrap();

        let res = DateResolver::with_default_providers(dir.path().join("no-ffprobe"))
            .resolve(&path, DateSource::CaptureTime);
        assert_eq!(res.date, NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(res.note, None);
    }

    #[test]
    fn test_date_source_labels_and_serde() {
        assert_eq!(DateSource::ModifiedTime.label(), "mtime");
        assert_eq!(DateSource::CaptureTime.label(), "capture");
        assert_eq!(serde_json::to_string(&DateSource::CreatedTime).unwrap(), "\"ctime\"");
        assert_eq!(
            serde_json::to_string(&DateNote::MetadataMissing).unwrap(),
            "\"metadata_missing\""
        );
    }
}
