//! # Import Module
//!
//! The per-file import pipeline: extract metadata, check the dedup store,
//! build the destination path, move the file, record the fingerprint.
//!
//! Per-file failures never abort the batch: each file either lands in the
//! archive (imported or duplicate) or is reported failed with its source
//! left untouched.

use crate::core::dest::build_destination;
use crate::core::metadata;
use crate::core::scanner::MediaFile;
use crate::core::store::DedupStore;
use crate::error::ImportError;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Outcome for a single file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FileStatus {
    /// First copy of this content; moved and recorded
    Imported { destination: PathBuf },
    /// Content already in the store; moved under the duplicate namespace,
    /// nothing recorded
    Duplicate {
        destination: PathBuf,
        original: PathBuf,
    },
    /// Left in place; nothing recorded
    Failed { reason: String },
}

/// A per-file failure with its offending path
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of an import run
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub total_files: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub failures: Vec<FileFailure>,
    pub duration_ms: u64,
}

/// Sequential import of scanned files into the archive
pub struct ImportPipeline<'a> {
    store: &'a DedupStore,
    target: &'a Path,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(store: &'a DedupStore, target: &'a Path) -> Self {
        Self { store, target }
    }

    /// Process every file to completion, in scan order.
    ///
    /// `on_file` is invoked once per file with its index, the total count,
    /// the source path, and the outcome.
    pub fn run<F>(&self, files: &[MediaFile], mut on_file: F) -> ImportReport
    where
        F: FnMut(usize, usize, &Path, &FileStatus),
    {
        let start = Instant::now();
        let mut imported = 0usize;
        let mut duplicates = 0usize;
        let mut failures = Vec::new();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for (index, file) in files.iter().enumerate() {
            let status = self.import_one(&file.path, &mut created_dirs);

            match &status {
                FileStatus::Imported { .. } => imported += 1,
                FileStatus::Duplicate { .. } => duplicates += 1,
                FileStatus::Failed { reason } => failures.push(FileFailure {
                    path: file.path.clone(),
                    reason: reason.clone(),
                }),
            }

            on_file(index, files.len(), &file.path, &status);
        }

        ImportReport {
            total_files: files.len(),
            imported,
            duplicates,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn import_one(&self, path: &Path, created_dirs: &mut HashSet<PathBuf>) -> FileStatus {
        let record = match metadata::extract(path) {
            Ok(record) => record,
            Err(e) => {
                return FileStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let fingerprint = record.fingerprint();
        let original = match self.store.lookup(&fingerprint) {
            Ok(original) => original,
            Err(e) => {
                return FileStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let now_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let destination =
            build_destination(path, &record, self.target, original.is_some(), now_epoch);

        if let Some(parent) = destination.parent() {
            if !created_dirs.contains(parent) {
                if let Err(e) = fs::create_dir_all(parent) {
                    return FileStatus::Failed {
                        reason: ImportError::CreateDirectory {
                            path: parent.to_path_buf(),
                            source: e,
                        }
                        .to_string(),
                    };
                }
                created_dirs.insert(parent.to_path_buf());
            }
        }

        if let Err(e) = relocate(path, &destination) {
            return FileStatus::Failed {
                reason: e.to_string(),
            };
        }

        match original {
            // The store keeps pointing at the first-imported copy
            Some(original) => FileStatus::Duplicate {
                destination,
                original,
            },
            None => match self.store.record(&fingerprint, &destination) {
                Ok(()) => FileStatus::Imported { destination },
                Err(e) => FileStatus::Failed {
                    reason: e.to_string(),
                },
            },
        }
    }
}

/// Move a file, falling back to copy-then-delete across filesystems.
///
/// On any failure other than the degenerate delete-after-verified-copy case
/// the source is left untouched.
fn relocate(source: &Path, destination: &Path) -> Result<(), ImportError> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_delete(source, destination)
        }
        Err(e) => Err(move_error(source, destination, e.to_string())),
    }
}

fn copy_then_delete(source: &Path, destination: &Path) -> Result<(), ImportError> {
    let source_size = fs::metadata(source)
        .map_err(|e| move_error(source, destination, e.to_string()))?
        .len();

    fs::copy(source, destination).map_err(|e| move_error(source, destination, e.to_string()))?;

    // Verify the copy landed whole before touching the source
    let dest_size = fs::metadata(destination)
        .map_err(|e| move_error(source, destination, e.to_string()))?
        .len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(move_error(
            source,
            destination,
            format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                source_size, dest_size
            ),
        ));
    }

    // The copy is verified at the destination; a failed source delete leaves
    // a stray original but the import itself succeeded
    if let Err(e) = fs::remove_file(source) {
        warn!(
            source = %source.display(),
            error = %e,
            "copied across filesystems but could not remove source"
        );
    }

    Ok(())
}

fn move_error(source: &Path, destination: &Path, reason: String) -> ImportError {
    ImportError::Move {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        reason,
    }
}
