//! # Store Module
//!
//! The persistent dedup record store: fingerprint → destination path of the
//! first-imported copy.
//!
//! The store lives in a fixed-name subdirectory under the target root and is
//! exclusively owned by one command invocation: opened at command start,
//! closed on drop. `import` and `report` open the existing store; `index`
//! deletes and recreates the directory for a destructive rebuild.

use crate::core::fingerprint::Fingerprint;
use crate::error::StoreError;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed subdirectory name under the target root
pub const STORE_DIR_NAME: &str = "archive-db";

const DB_FILE_NAME: &str = "records.db";

/// Persistent mapping from content fingerprint to first-seen destination
///
/// Single-writer by design; the connection is not shared across threads.
pub struct DedupStore {
    conn: Connection,
    db_path: PathBuf,
}

impl DedupStore {
    /// The store directory for a target root
    pub fn dir(target: &Path) -> PathBuf {
        target.join(STORE_DIR_NAME)
    }

    /// Whether a store directory exists at the target
    pub fn exists(target: &Path) -> bool {
        Self::dir(target).is_dir()
    }

    /// Open the store at the target root, creating the directory (and an
    /// empty store) if absent
    pub fn open(target: &Path) -> Result<Self, StoreError> {
        let dir = Self::dir(target);
        fs::create_dir_all(&dir).map_err(|e| StoreError::OpenFailed {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        let db_path = dir.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path).map_err(|e| StoreError::OpenFailed {
            path: db_path.clone(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                hash TEXT NOT NULL,
                size INTEGER NOT NULL,
                destination TEXT NOT NULL,
                PRIMARY KEY (hash, size)
            )",
            [],
        )
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(Self { conn, db_path })
    }

    /// Delete any existing store directory and open a fresh, empty store
    pub fn recreate(target: &Path) -> Result<Self, StoreError> {
        let dir = Self::dir(target);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| StoreError::OpenFailed {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
        }
        Self::open(target)
    }

    /// Destination recorded for a fingerprint, if any
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<PathBuf>, StoreError> {
        let result = self.conn.query_row(
            "SELECT destination FROM records WHERE hash = ?1 AND size = ?2",
            params![fingerprint.hash, fingerprint.size as i64],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(destination) => Ok(Some(PathBuf::from(destination))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    /// Record a fingerprint's destination.
    ///
    /// Import guards this with a lookup so it is write-once in normal
    /// operation; index records unconditionally during a rebuild and a
    /// colliding fingerprint keeps the later path.
    pub fn record(&self, fingerprint: &Fingerprint, destination: &Path) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO records (hash, size, destination) VALUES (?1, ?2, ?3)",
                params![
                    fingerprint.hash,
                    fingerprint.size as i64,
                    destination.to_string_lossy()
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    /// Total distinct fingerprints recorded
    pub fn count(&self) -> Result<u64, StoreError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u64)
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))
    }

    /// Path of the underlying database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Record count for the `report` command.
///
/// Never creates the store: an absent store directory is `NotFound`.
pub fn record_count(target: &Path) -> Result<u64, StoreError> {
    if !DedupStore::exists(target) {
        return Err(StoreError::NotFound {
            path: DedupStore::dir(target),
        });
    }
    DedupStore::open(target)?.count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fingerprint(hash: &str, size: u64) -> Fingerprint {
        Fingerprint {
            hash: hash.to_string(),
            size,
        }
    }

    #[test]
    fn open_creates_store_directory_and_database() {
        let target = TempDir::new().unwrap();

        let store = DedupStore::open(target.path()).unwrap();

        assert!(DedupStore::exists(target.path()));
        assert!(store.db_path().exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn record_and_lookup_roundtrip() {
        let target = TempDir::new().unwrap();
        let store = DedupStore::open(target.path()).unwrap();
        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);

        store.record(&fp, Path::new("/archive/photo/2024/03/a.jpg")).unwrap();

        assert_eq!(
            store.lookup(&fp).unwrap(),
            Some(PathBuf::from("/archive/photo/2024/03/a.jpg"))
        );
    }

    #[test]
    fn lookup_of_unknown_fingerprint_is_none() {
        let target = TempDir::new().unwrap();
        let store = DedupStore::open(target.path()).unwrap();

        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);
        assert_eq!(store.lookup(&fp).unwrap(), None);
    }

    #[test]
    fn fingerprints_differ_when_either_component_differs() {
        let target = TempDir::new().unwrap();
        let store = DedupStore::open(target.path()).unwrap();

        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);
        store.record(&fp, Path::new("/a")).unwrap();

        assert_eq!(
            store.lookup(&fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 43)).unwrap(),
            None
        );
        assert_eq!(
            store.lookup(&fingerprint("BBBBBBBBBBBBBBBBBBBBBB", 42)).unwrap(),
            None
        );
    }

    #[test]
    fn recording_the_same_fingerprint_keeps_one_row() {
        let target = TempDir::new().unwrap();
        let store = DedupStore::open(target.path()).unwrap();
        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);

        store.record(&fp, Path::new("/first")).unwrap();
        store.record(&fp, Path::new("/second")).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.lookup(&fp).unwrap(), Some(PathBuf::from("/second")));
    }

    #[test]
    fn records_persist_across_opens() {
        let target = TempDir::new().unwrap();
        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);

        {
            let store = DedupStore::open(target.path()).unwrap();
            store.record(&fp, Path::new("/kept")).unwrap();
        }

        let store = DedupStore::open(target.path()).unwrap();
        assert_eq!(store.lookup(&fp).unwrap(), Some(PathBuf::from("/kept")));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn recreate_drops_existing_records() {
        let target = TempDir::new().unwrap();
        let fp = fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 42);

        {
            let store = DedupStore::open(target.path()).unwrap();
            store.record(&fp, Path::new("/kept")).unwrap();
        }

        let store = DedupStore::recreate(target.path()).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn record_count_without_store_is_not_found() {
        let target = TempDir::new().unwrap();

        let error = record_count(target.path()).unwrap_err();
        assert!(matches!(error, StoreError::NotFound { .. }));
    }

    #[test]
    fn record_count_reads_existing_store() {
        let target = TempDir::new().unwrap();
        {
            let store = DedupStore::open(target.path()).unwrap();
            store
                .record(&fingerprint("AAAAAAAAAAAAAAAAAAAAAA", 1), Path::new("/a"))
                .unwrap();
            store
                .record(&fingerprint("BBBBBBBBBBBBBBBBBBBBBB", 2), Path::new("/b"))
                .unwrap();
        }

        assert_eq!(record_count(target.path()).unwrap(), 2);
    }
}
