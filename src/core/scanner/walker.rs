//! Directory walking implementation using walkdir.

use super::{filter::MediaFilter, MediaFile, ScanResult};
use crate::error::ScanError;
use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Recursive scanner over a directory tree
///
/// Fails soft: unreadable directories and files are recorded as errors and
/// logged, and the walk continues.
pub struct WalkDirScanner;

impl WalkDirScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan a root directory and return every supported media file under it
    pub fn scan(&self, root: &Path) -> ScanResult {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        if !root.is_dir() {
            errors.push(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
            return ScanResult { files, errors };
        }

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_hidden(e, root));

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if !entry.file_type().is_file() || !MediaFilter::should_include(path) {
                        continue;
                    }

                    // Safe: should_include only passes allowlisted extensions
                    let kind = match MediaFilter::kind_of(path) {
                        Some(kind) => kind,
                        None => continue,
                    };

                    match fs::metadata(path) {
                        Ok(metadata) => files.push(MediaFile {
                            path: path.to_path_buf(),
                            size: metadata.len(),
                            modified: metadata
                                .modified()
                                .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                            kind,
                        }),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "skipping unreadable file");
                            errors.push(ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            });
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "skipping unreadable directory entry");

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    errors.push(error);
                }
            }
        }

        ScanResult { files, errors }
    }

    fn is_hidden(entry: &DirEntry, root: &Path) -> bool {
        entry.path() != root
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    }
}

impl Default for WalkDirScanner {
    fn default() -> Self {
        Self::new()
    }
}
