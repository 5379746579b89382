//! # Metadata Module
//!
//! Produces the normalized per-file record the import and index pipelines
//! run on: capture timestamp with a reliability tier, content fingerprint,
//! and optional GPS coordinates.
//!
//! ## Timestamp Resolution
//! A capture time is **reliable** only when it came from well-formed embedded
//! metadata and passed validation. Everything else falls back to the file's
//! modification time, carried at the same second precision so downstream
//! formatting is uniform regardless of source.

mod exif;

pub use exif::CAPTURE_TIME_FORMAT;

use crate::core::fingerprint::{self, Fingerprint};
use crate::core::scanner::{MediaFilter, MediaKind};
use crate::error::ExtractError;
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// GPS position in decimal degrees, sign-adjusted for hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized metadata for one media file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Capture timestamp, second precision
    pub capture_time: NaiveDateTime,
    /// True only when `capture_time` came from validated embedded metadata
    pub reliable: bool,
    /// Exact file size in bytes at read time
    pub size_bytes: u64,
    /// 22-character printable digest of the full file contents
    pub content_hash: String,
    /// Present only when both axes decoded cleanly
    pub gps: Option<GpsCoordinates>,
    /// Photo or video, per extension
    pub kind: MediaKind,
}

impl MediaRecord {
    /// The dedup identity of this file's content
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            hash: self.content_hash.clone(),
            size: self.size_bytes,
        }
    }

    /// Capture time in the uniform `YYYY:MM:DD HH:MM:SS` shape
    pub fn capture_time_string(&self) -> String {
        self.capture_time.format(CAPTURE_TIME_FORMAT).to_string()
    }
}

/// Extract the normalized record for one file
///
/// Embedded-metadata failures are swallowed (modification-time fallback);
/// an unreadable file is a hard error and produces no record.
pub fn extract(path: &Path) -> Result<MediaRecord, ExtractError> {
    let kind = MediaFilter::kind_of(path).ok_or_else(|| ExtractError::UnsupportedType {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string(),
    })?;

    // Size and hash come from the on-disk bytes no matter how the
    // capture-time lookup goes
    let (content_hash, size_bytes) =
        fingerprint::hash_file(path).map_err(|source| ExtractError::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;

    let modified = modified_time(path)?;

    let (capture_time, reliable, gps) = match kind {
        MediaKind::Photo => {
            let embedded = exif::read_embedded(path).unwrap_or_default();
            match embedded.capture_time {
                Some(time) => (time, true, embedded.gps),
                None => {
                    debug!(path = %path.display(), "no valid embedded capture time, using mtime");
                    (modified, false, embedded.gps)
                }
            }
        }
        MediaKind::Video => (modified, false, None),
    };

    Ok(MediaRecord {
        capture_time,
        reliable,
        size_bytes,
        content_hash,
        gps,
        kind,
    })
}

/// Modification time as a zone-less local timestamp, truncated to seconds
fn modified_time(path: &Path) -> Result<NaiveDateTime, ExtractError> {
    let metadata = fs::metadata(path).map_err(|source| ExtractError::ReadFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let modified = metadata.modified().map_err(|source| ExtractError::ReadFailure {
        path: path.to_path_buf(),
        source,
    })?;

    let local: DateTime<Local> = modified.into();
    let naive = local.naive_local();
    Ok(naive.with_nanosecond(0).unwrap_or(naive))
}
