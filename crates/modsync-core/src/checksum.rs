//! Streaming file digests.
//!
//! The same `hash_of` is used for catalog-cache comparison and artifact
//! verification so both produce directly comparable lowercase hex strings.

use crate::error::{Result, SyncError};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Digest algorithms understood by the checksum helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// What the mod portal declares for every release.
    #[default]
    Sha1,
    Sha256,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("unsupported hash algorithm: {}", other)),
        }
    }
}

/// Content hash of the file at `path`, or `None` if it does not exist.
///
/// A missing file is "absent", not an error; anything else that stops the
/// read is returned as `SyncError::Io`.
pub fn hash_of(path: &Path) -> Result<Option<String>> {
    match File::open(path) {
        Ok(f) => digest_reader(f, HashAlgorithm::Sha1)
            .map(Some)
            .map_err(|e| SyncError::io("read", path, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::io("open", path, e)),
    }
}

/// Digest of an existing file with the chosen algorithm.
pub fn digest_path(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let f = File::open(path).map_err(|e| SyncError::io("open", path, e))?;
    digest_reader(f, algorithm).map_err(|e| SyncError::io("read", path, e))
}

/// Reads in chunks to keep memory use bounded; suitable for large files.
fn digest_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> io::Result<String> {
    match algorithm {
        HashAlgorithm::Sha1 => stream::<Sha1, R>(reader),
        HashAlgorithm::Sha256 => stream::<Sha256, R>(reader),
    }
}

fn stream<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Case-insensitive comparison of two hex digests.
pub fn digests_match(actual: &str, declared: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(declared.trim())
}
