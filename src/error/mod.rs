//! # Error Module
//!
//! Error types for the media archiver.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file errors stay local** - a failed file never aborts the batch;
//!   only store-open failure and malformed invocation are whole-run fatal

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ArchiverError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Metadata extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// Errors that occur while discovering media files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while extracting metadata from a single file
///
/// Embedded capture-metadata failures are not represented here: they are
/// recovered locally by falling back to the modification time and never
/// surface to the caller.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type \"{extension}\": {path}")]
    UnsupportedType { path: PathBuf, extension: String },

    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur with the dedup record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open record store at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("No record store found at {path}")]
    NotFound { path: PathBuf },

    #[error("Store query failed: {0}")]
    QueryFailed(String),

    #[error("Record store corrupted at {path}. Rebuild it with the index command.")]
    Corrupted { path: PathBuf },
}

/// Errors that occur while relocating a file into the archive
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {source_path} to {destination}: {reason}")]
    Move {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ArchiverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_error_includes_path_and_extension() {
        let error = ExtractError::UnsupportedType {
            path: PathBuf::from("/photos/notes.txt"),
            extension: "txt".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/notes.txt"));
        assert!(message.contains("txt"));
    }

    #[test]
    fn store_error_suggests_recovery() {
        let error = StoreError::Corrupted {
            path: PathBuf::from("/archive/archive-db"),
        };
        let message = error.to_string();
        assert!(message.contains("index command"));
    }

    #[test]
    fn move_error_includes_both_paths() {
        let error = ImportError::Move {
            source_path: PathBuf::from("/in/a.jpg"),
            destination: PathBuf::from("/out/photo/2024/03/a.jpg"),
            reason: "disk full".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/in/a.jpg"));
        assert!(message.contains("/out/photo/2024/03/a.jpg"));
        assert!(message.contains("disk full"));
    }
}
