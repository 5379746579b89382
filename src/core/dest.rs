//! Destination path construction.
//!
//! `target / [duplication] / {photo|video} / YYYY / MM /
//! DD_HH_MM_SS_{exif|mod}_{epoch}{ext}`. The epoch is wall-clock time at
//! path-build time and exists only to keep same-second imports from
//! colliding; dedup correctness lives in the fingerprint store, not here.

use crate::core::metadata::MediaRecord;
use chrono::{Datelike, Timelike};
use std::path::{Path, PathBuf};

/// Extra namespace segment for files identified as duplicates
pub const DUPLICATE_DIR_NAME: &str = "duplication";

/// Build the destination path for one file.
///
/// Pure: the caller supplies the clock. Extension is taken verbatim (with
/// original case) from the source file name. Re-running an import does not
/// reproduce byte-identical paths because the epoch varies; duplicates are
/// still flagged via the store and land under a fresh duplicate path.
pub fn build_destination(
    source: &Path,
    record: &MediaRecord,
    target_root: &Path,
    is_duplicate: bool,
    now_epoch: u64,
) -> PathBuf {
    let time = record.capture_time;
    let tag = if record.reliable { "exif" } else { "mod" };
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let filename = format!(
        "{:02}_{:02}_{:02}_{:02}_{}_{}{}",
        time.day(),
        time.hour(),
        time.minute(),
        time.second(),
        tag,
        now_epoch,
        ext
    );

    let mut path = target_root.to_path_buf();
    if is_duplicate {
        path.push(DUPLICATE_DIR_NAME);
    }
    path.push(record.kind.dir_name());
    path.push(format!("{:04}", time.year()));
    path.push(format!("{:02}", time.month()));
    path.push(filename);
    path
}
