//! File filtering logic for the scanner.

use super::MediaKind;
use std::path::Path;

/// Filters files to the supported photo/video extensions
pub struct MediaFilter;

impl MediaFilter {
    /// Photo extension allowlist (lowercase)
    pub const PHOTO_EXTENSIONS: &'static [&'static str] = &[
        "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif",
    ];

    /// Video extension allowlist (lowercase), disjoint from the photo list
    pub const VIDEO_EXTENSIONS: &'static [&'static str] =
        &["mp4", "mov", "avi", "mkv", "wmv", "webm", "m4v"];

    /// Check if a file should be included in a scan
    ///
    /// Dot-files are always excluded.
    pub fn should_include(path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        Self::kind_of(path).is_some()
    }

    /// Classify a path by its extension
    pub fn kind_of(path: &Path) -> Option<MediaKind> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(MediaKind::from_extension)
    }
}
