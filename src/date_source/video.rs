use chrono::{DateTime, Local, NaiveDateTime, Utc};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

use super::provider::{lower_extension, parse_media_datetime, MetadataOutcome, MetadataProvider};

/// Containers probed through the external `ffprobe` tool
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "avi", "mkv"];

/// Containers whose `mvhd` box can be read natively
const ISO_BMFF_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];

// Seconds between 1904-01-01 (QuickTime epoch) and 1970-01-01
const QT_TO_UNIX_OFFSET: i64 = 2_082_844_800;

const CREATION_TAGS: [&str; 2] = ["creation_time", "com.apple.quicktime.creationdate"];

/// Reads the movie header creation time of MP4/MOV files without external tools
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoBmffProvider;

impl MetadataProvider for IsoBmffProvider {
    fn name(&self) -> &'static str {
        "iso-bmff"
    }

    fn capture_datetime(&self, path: &Path) -> MetadataOutcome {
        match lower_extension(path) {
            Some(ext) if ISO_BMFF_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => return MetadataOutcome::Unavailable,
        }

        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return MetadataOutcome::Unavailable,
        };
        let len = match file.metadata() {
            Ok(m) => m.len(),
            Err(_) => return MetadataOutcome::Unavailable,
        };

        let Some(moov) = find_box(&mut file, 0, len, *b"moov") else {
            return MetadataOutcome::Missing;
        };
        let Some(mvhd) = find_box(&mut file, moov.data_start, moov.data_end, *b"mvhd") else {
            return MetadataOutcome::Missing;
        };

        match read_mvhd_creation(&mut file, mvhd) {
            Some(dt) => MetadataOutcome::Found(dt),
            None => MetadataOutcome::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BoxRange {
    data_start: u64,
    data_end: u64,
}

fn find_box(file: &mut File, start: u64, end: u64, kind: [u8; 4]) -> Option<BoxRange> {
    let mut offset = start;

    while offset + 8 <= end {
        file.seek(SeekFrom::Start(offset)).ok()?;
        let mut header = [0u8; 8];
        file.read_exact(&mut header).ok()?;

        let mut size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
        let mut header_len = 8u64;

        if size == 1 {
            let mut large = [0u8; 8];
            file.read_exact(&mut large).ok()?;
            size = u64::from_be_bytes(large);
            header_len = 16;
        } else if size == 0 {
            // Box runs to the end of its parent
            size = end - offset;
        }

        if size < header_len {
            return None;
        }
        let box_end = offset.saturating_add(size).min(end);

        if header[4..8] == kind {
            return Some(BoxRange {
                data_start: offset + header_len,
                data_end: box_end,
            });
        }
        offset = box_end;
    }

    None
}

fn read_mvhd_creation(file: &mut File, mvhd: BoxRange) -> Option<NaiveDateTime> {
    file.seek(SeekFrom::Start(mvhd.data_start)).ok()?;
    let mut version_flags = [0u8; 4];
    file.read_exact(&mut version_flags).ok()?;

    let seconds = if version_flags[0] == 1 {
        let mut buf = [0u8; 8];
        file.read_exact(&mut buf).ok()?;
        u64::from_be_bytes(buf)
    } else {
        let mut buf = [0u8; 4];
        file.read_exact(&mut buf).ok()?;
        u32::from_be_bytes(buf) as u64
    };

    // Zero means the muxer never filled it in
    if seconds == 0 {
        return None;
    }

    let unix = i64::try_from(seconds).ok()?.checked_sub(QT_TO_UNIX_OFFSET)?;
    let utc = DateTime::<Utc>::from_timestamp(unix, 0)?;
    Some(utc.with_timezone(&Local).naive_local())
}

/// Asks `ffprobe` for container and stream creation tags
#[derive(Debug)]
pub struct FfprobeProvider {
    program: PathBuf,
    available: OnceCell<bool>,
}

impl FfprobeProvider {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            available: OnceCell::new(),
        }
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let ok = Command::new(&self.program)
                .arg("-version")
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false);
            debug!(program = ?self.program, available = ok, "Probed for ffprobe");
            ok
        })
    }
}

impl Default for FfprobeProvider {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MetadataProvider for FfprobeProvider {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    fn capture_datetime(&self, path: &Path) -> MetadataOutcome {
        match lower_extension(path) {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => return MetadataOutcome::Unavailable,
        }

        if !self.is_available() {
            return MetadataOutcome::Unavailable;
        }

        let output = Command::new(&self.program)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output();

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                trace!(path = ?path, status = ?out.status, "ffprobe failed");
                return MetadataOutcome::Unavailable;
            }
            Err(e) => {
                trace!(path = ?path, error = %e, "ffprobe could not be run");
                return MetadataOutcome::Unavailable;
            }
        };

        match serde_json::from_slice::<Value>(&output.stdout) {
            Ok(doc) => creation_from_probe(&doc),
            Err(_) => MetadataOutcome::Unavailable,
        }
    }
}

/// Pick the first parseable creation tag from `format` then `streams`
fn creation_from_probe(doc: &Value) -> MetadataOutcome {
    let format_tags = doc.pointer("/format/tags").into_iter();
    let stream_tags = doc
        .get("streams")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|stream| stream.get("tags"));

    for tags in format_tags.chain(stream_tags) {
        let found = CREATION_TAGS
            .iter()
            .filter_map(|key| tags.get(*key).and_then(Value::as_str))
            .find_map(parse_media_datetime);

        if let Some(dt) = found {
            return MetadataOutcome::Found(dt);
        }
    }

    MetadataOutcome::Missing
}
