use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

use super::provider::{MetadataOutcome, MetadataProvider};

// Checked in order of preference
const DATETIME_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads photo capture time from EXIF (JPEG, TIFF, HEIF, PNG, WebP containers)
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifProvider;

impl MetadataProvider for ExifProvider {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn capture_datetime(&self, path: &Path) -> MetadataOutcome {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                trace!(path = ?path, error = %e, "Cannot open file for EXIF");
                return MetadataOutcome::Unavailable;
            }
        };

        let mut reader = BufReader::new(file);
        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => return MetadataOutcome::Missing,
            Err(e) => {
                trace!(path = ?path, error = %e, "No readable EXIF container");
                return MetadataOutcome::Unavailable;
            }
        };

        for tag in DATETIME_TAGS {
            let Some(field) = exif.get_field(tag, In::PRIMARY) else {
                continue;
            };

            let raw = match &field.value {
                Value::Ascii(values) => values
                    .first()
                    .map(|bytes| String::from_utf8_lossy(bytes).to_string()),
                _ => None,
            };

            if let Some(dt) = raw.as_deref().and_then(parse_exif_datetime) {
                return MetadataOutcome::Found(dt);
            }
        }

        MetadataOutcome::Missing
    }
}

/// Parse `YYYY:MM:DD HH:MM:SS`, ignoring sub-second or zone suffixes
fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('\0');
    let head = trimmed.get(..19).unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(head, EXIF_DATETIME_FORMAT).ok()
}
