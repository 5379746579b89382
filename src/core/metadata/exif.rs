//! Embedded capture-metadata reading via EXIF.
//!
//! The reader's heterogeneous failure modes (missing segment, malformed
//! structure, unsupported encoding) are normalized behind a single typed
//! result: `read_embedded` either succeeds with whatever fields were
//! recoverable, or returns `None`. Nothing in here propagates an error.

use super::GpsCoordinates;
use chrono::NaiveDateTime;
use exif::{Exif, In, Rational, Reader, Tag, Value};
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// Capture fields recovered from a file's embedded metadata
#[derive(Debug, Clone, Default)]
pub struct EmbeddedMetadata {
    /// Validated capture timestamp, second precision
    pub capture_time: Option<NaiveDateTime>,
    /// Decimal-degree coordinates, hemisphere sign-adjusted
    pub gps: Option<GpsCoordinates>,
}

/// EXIF capture timestamps are `YYYY:MM:DD HH:MM:SS`, zone-less local time.
static CAPTURE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}:\d{2}:\d{2} \d{2}:\d{2}:\d{2}$").unwrap());

pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Read embedded metadata from a photo file
///
/// Returns `None` when the file has no readable EXIF segment; the caller
/// falls back to the filesystem modification time.
pub fn read_embedded(path: &Path) -> Option<EmbeddedMetadata> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "embedded metadata unreadable");
            return None;
        }
    };

    let mut reader = BufReader::new(&file);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "embedded metadata unreadable");
            return None;
        }
    };

    Some(EmbeddedMetadata {
        capture_time: capture_time(&exif),
        gps: gps(&exif),
    })
}

/// First valid timestamp among the known capture-time tags, original first
fn capture_time(exif: &Exif) -> Option<NaiveDateTime> {
    for tag in [Tag::DateTimeOriginal, Tag::DateTime] {
        if let Some(raw) = ascii_value(exif, tag) {
            if let Some(parsed) = parse_capture_string(&raw) {
                return Some(parsed);
            }
        }
    }
    None
}

/// Validate and parse a raw capture-time string.
///
/// The value must match the positional pattern exactly and must not start
/// with `0`: some writers emit a zero-epoch sentinel (`0000:00:00 00:00:00`)
/// that passes the pattern but is not a capture time.
pub(crate) fn parse_capture_string(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim_end_matches('\0').trim();

    if !CAPTURE_TIME_RE.is_match(value) || value.starts_with('0') {
        return None;
    }

    NaiveDateTime::parse_from_str(value, CAPTURE_TIME_FORMAT).ok()
}

/// Decode both GPS axes; either one missing or malformed yields `None`
fn gps(exif: &Exif) -> Option<GpsCoordinates> {
    let latitude = gps_axis(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let longitude = gps_axis(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
    Some(GpsCoordinates {
        latitude,
        longitude,
    })
}

fn gps_axis(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let triplet = match field.value {
        Value::Rational(ref vec) if vec.len() >= 3 => &vec[..3],
        _ => return None,
    };
    let hemisphere = ascii_value(exif, ref_tag)?;
    Some(to_decimal_degrees(triplet, &hemisphere))
}

/// Convert a degree/minute/second rational triplet to decimal degrees,
/// negated for southern/western hemispheres
pub(crate) fn to_decimal_degrees(triplet: &[Rational], hemisphere: &str) -> f64 {
    let degrees = rational_to_f64(&triplet[0]);
    let minutes = rational_to_f64(&triplet[1]);
    let seconds = rational_to_f64(&triplet[2]);

    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    if hemisphere.starts_with('S') || hemisphere.starts_with('W') {
        -value
    } else {
        value
    }
}

fn rational_to_f64(r: &Rational) -> f64 {
    if r.denom == 0 {
        0.0
    } else {
        r.num as f64 / r.denom as f64
    }
}

fn ascii_value(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    if let Value::Ascii(ref vec) = field.value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}
