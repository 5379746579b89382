//! # Scanner Module
//!
//! Discovers photo and video files under a directory.
//!
//! ## Supported Formats
//! - Photos: JPEG, PNG, GIF, BMP, TIFF, WebP, HEIC/HEIF
//! - Videos: MP4, MOV, AVI, MKV, WMV, WebM, M4V
//!
//! Dot-files are skipped, and directories that cannot be read are logged and
//! skipped rather than aborting the scan.
//!
//! ## Example
//! ```rust,ignore
//! use media_archiver::core::scanner::WalkDirScanner;
//!
//! let result = WalkDirScanner::new().scan(Path::new("/Users/photos"));
//! ```

mod filter;
mod walker;

pub use filter::MediaFilter;
pub use walker::WalkDirScanner;

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;

/// Media categories, decided by file extension at dispatch time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Classify a lowercased extension against the two allowlists
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        if MediaFilter::PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else if MediaFilter::VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Archive subtree name for this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

/// A discovered media file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub modified: SystemTime,
    /// Photo or video, per extension
    pub kind: MediaKind,
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Successfully discovered media files
    pub files: Vec<MediaFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
