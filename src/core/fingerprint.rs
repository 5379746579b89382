//! Content fingerprinting for dedup.
//!
//! Two files are duplicates iff both the content hash and the byte size
//! match. The pair guards against truncation collisions and leaves room for
//! a size-first short-circuit, though this implementation always hashes.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

const READ_BUF_SIZE: usize = 64 * 1024;

/// The dedup identity of a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// 22-character unpadded base64 of the 128-bit content hash
    pub hash: String,
    /// Exact file size in bytes
    pub size: u64,
}

/// Hash a file's full contents, returning the printable digest and byte size
pub fn hash_file(path: &Path) -> std::io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let mut hasher = Xxh3::new();
    let mut buf = [0u8; READ_BUF_SIZE];
    let mut size = 0u64;

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((encode_digest(hasher.digest128()), size))
}

fn encode_digest(digest: u128) -> String {
    STANDARD_NO_PAD.encode(digest.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn hash_is_22_printable_characters() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "a.jpg", b"some photo bytes");

        let (hash, size) = hash_file(&path).unwrap();

        assert_eq!(hash.len(), 22);
        assert!(hash.is_ascii());
        assert_eq!(size, 16);
    }

    #[test]
    fn identical_contents_hash_identically() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_file(&temp_dir, "a.jpg", b"same bytes");
        let b = write_file(&temp_dir, "b.jpg", b"same bytes");

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn one_byte_change_alters_hash_but_not_size() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_file(&temp_dir, "a.jpg", b"payload-A");
        let b = write_file(&temp_dir, "b.jpg", b"payload-B");

        let (hash_a, size_a) = hash_file(&a).unwrap();
        let (hash_b, size_b) = hash_file(&b).unwrap();

        assert_eq!(size_a, size_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn fingerprint_equality_is_pairwise() {
        let a = Fingerprint {
            hash: "AAAAAAAAAAAAAAAAAAAAAA".to_string(),
            size: 10,
        };
        let same_hash_other_size = Fingerprint {
            hash: "AAAAAAAAAAAAAAAAAAAAAA".to_string(),
            size: 11,
        };
        let other_hash_same_size = Fingerprint {
            hash: "BBBBBBBBBBBBBBBBBBBBBB".to_string(),
            size: 10,
        };

        assert_ne!(a, same_hash_other_size);
        assert_ne!(a, other_hash_same_size);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn hash_of_missing_file_is_an_error() {
        assert!(hash_file(Path::new("/nonexistent/file.jpg")).is_err());
    }
}
