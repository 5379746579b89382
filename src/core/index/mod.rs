//! # Index Module
//!
//! Destructive rebuild of the dedup record store from the archive's own
//! `photo/` and `video/` subtrees. The store directory is deleted and
//! recreated, then every archived file is re-fingerprinted and recorded.

use crate::core::import::FileFailure;
use crate::core::metadata;
use crate::core::scanner::{MediaFile, MediaKind, WalkDirScanner};
use crate::core::store::DedupStore;
use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

/// Outcome for a single re-indexed file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum IndexStatus {
    Indexed { path: PathBuf },
    Failed { reason: String },
}

/// Summary of an index rebuild
#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub total_files: usize,
    pub indexed: usize,
    pub failures: Vec<FileFailure>,
    pub duration_ms: u64,
}

/// Rebuilds the store from the archived tree
pub struct IndexRebuilder<'a> {
    target: &'a Path,
}

impl<'a> IndexRebuilder<'a> {
    pub fn new(target: &'a Path) -> Self {
        Self { target }
    }

    /// Every archived file under the `photo/` and `video/` subtrees.
    ///
    /// Either subtree may be absent and contributes zero files.
    pub fn archived_files(&self) -> Vec<MediaFile> {
        let scanner = WalkDirScanner::new();
        let mut files = Vec::new();

        for kind in [MediaKind::Photo, MediaKind::Video] {
            let subtree = self.target.join(kind.dir_name());
            if !subtree.is_dir() {
                continue;
            }
            let result = scanner.scan(&subtree);
            for error in &result.errors {
                warn!(error = %error, "scan error during index rebuild");
            }
            files.extend(result.files);
        }

        files
    }

    /// Drop and recreate the store, then record every archived file.
    ///
    /// Extraction failures are skipped and the rebuild continues; only a
    /// store that cannot be recreated aborts the command. Fingerprints are
    /// recorded unconditionally, so a colliding fingerprint keeps the path
    /// seen last.
    pub fn run<F>(&self, files: &[MediaFile], mut on_file: F) -> Result<IndexReport>
    where
        F: FnMut(usize, usize, &Path, &IndexStatus),
    {
        let start = Instant::now();
        let store = DedupStore::recreate(self.target)?;

        let mut indexed = 0usize;
        let mut failures = Vec::new();

        for (index, file) in files.iter().enumerate() {
            let status = match metadata::extract(&file.path) {
                Ok(record) => match store.record(&record.fingerprint(), &file.path) {
                    Ok(()) => IndexStatus::Indexed {
                        path: file.path.clone(),
                    },
                    Err(e) => IndexStatus::Failed {
                        reason: e.to_string(),
                    },
                },
                Err(e) => IndexStatus::Failed {
                    reason: e.to_string(),
                },
            };

            match &status {
                IndexStatus::Indexed { .. } => indexed += 1,
                IndexStatus::Failed { reason } => {
                    warn!(path = %file.path.display(), reason = %reason, "skipping file during index rebuild");
                    failures.push(FileFailure {
                        path: file.path.clone(),
                        reason: reason.clone(),
                    });
                }
            }

            on_file(index, files.len(), &file.path, &status);
        }

        Ok(IndexReport {
            total_files: files.len(),
            indexed,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) {
        fs::create_dir_all(dir).unwrap();
        fs::File::create(dir.join(name))
            .unwrap()
            .write_all(contents)
            .unwrap();
    }

    #[test]
    fn rebuild_of_empty_target_yields_empty_store() {
        let target = TempDir::new().unwrap();
        let rebuilder = IndexRebuilder::new(target.path());

        let files = rebuilder.archived_files();
        let report = rebuilder.run(&files, |_, _, _, _| {}).unwrap();

        assert_eq!(report.total_files, 0);
        assert_eq!(store::record_count(target.path()).unwrap(), 0);
    }

    #[test]
    fn rebuild_records_every_archived_file() {
        let target = TempDir::new().unwrap();
        write_file(&target.path().join("photo/2024/03"), "05_10_00_00_mod_1.jpg", b"one");
        write_file(&target.path().join("video/2023/12"), "25_08_30_00_mod_2.mp4", b"two");

        let rebuilder = IndexRebuilder::new(target.path());
        let files = rebuilder.archived_files();
        let report = rebuilder.run(&files, |_, _, _, _| {}).unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.indexed, 2);
        assert_eq!(store::record_count(target.path()).unwrap(), 2);
    }

    #[test]
    fn rebuild_replaces_stale_records() {
        let target = TempDir::new().unwrap();
        write_file(&target.path().join("photo/2024/03"), "05_10_00_00_mod_1.jpg", b"kept");

        {
            let stale = DedupStore::open(target.path()).unwrap();
            stale
                .record(
                    &crate::core::fingerprint::Fingerprint {
                        hash: "STALESTALESTALESTALEST".to_string(),
                        size: 999,
                    },
                    Path::new("/no/longer/here.jpg"),
                )
                .unwrap();
            assert_eq!(stale.count().unwrap(), 1);
        }

        let rebuilder = IndexRebuilder::new(target.path());
        let files = rebuilder.archived_files();
        rebuilder.run(&files, |_, _, _, _| {}).unwrap();

        // Only the file actually on disk remains recorded
        assert_eq!(store::record_count(target.path()).unwrap(), 1);
    }

    #[test]
    fn rebuild_twice_is_idempotent() {
        let target = TempDir::new().unwrap();
        write_file(&target.path().join("photo/2024/03"), "05_10_00_00_mod_1.jpg", b"one");
        write_file(&target.path().join("photo/2024/04"), "01_09_15_00_mod_2.jpg", b"two");

        let rebuilder = IndexRebuilder::new(target.path());
        let first = rebuilder
            .run(&rebuilder.archived_files(), |_, _, _, _| {})
            .unwrap();
        let second = rebuilder
            .run(&rebuilder.archived_files(), |_, _, _, _| {})
            .unwrap();

        assert_eq!(first.indexed, second.indexed);
        assert_eq!(store::record_count(target.path()).unwrap(), 2);
    }

    #[test]
    fn absent_subtrees_contribute_zero_files() {
        let target = TempDir::new().unwrap();
        write_file(&target.path().join("photo/2024/03"), "05_10_00_00_mod_1.jpg", b"one");
        // no video/ subtree

        let rebuilder = IndexRebuilder::new(target.path());
        let files = rebuilder.archived_files();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn duplication_namespace_is_not_reindexed() {
        let target = TempDir::new().unwrap();
        write_file(&target.path().join("photo/2024/03"), "05_10_00_00_mod_1.jpg", b"one");
        write_file(
            &target.path().join("duplication/photo/2024/03"),
            "05_10_00_00_mod_2.jpg",
            b"one",
        );

        let rebuilder = IndexRebuilder::new(target.path());
        let files = rebuilder.archived_files();

        assert_eq!(files.len(), 1);
    }
}
