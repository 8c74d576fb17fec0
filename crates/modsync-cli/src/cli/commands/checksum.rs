//! Checksum command: compute the digest of a file.

use anyhow::Result;
use modsync_core::checksum::{self, HashAlgorithm};
use std::path::Path;

/// Compute and print the digest of the given file, `sha1sum`-style.
pub fn run_checksum(path: &Path, algorithm: HashAlgorithm) -> Result<()> {
    let digest = checksum::digest_path(path, algorithm)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
