//! Item fetcher: make one catalog entry's artifact present and verified.
//!
//! Invariant: a file at an artifact path either hashes to the declared
//! value or is deleted. Fresh downloads go to `<file>.part` and are renamed
//! into place only after their hash matches.

mod outcome;

pub use outcome::{FetchOutcome, SkipReason};

use crate::catalog::{CatalogEntry, LatestRelease};
use crate::checksum;
use crate::config::{Credentials, SyncConfig};
use crate::error::{Result, SyncError};
use crate::http::{self, HttpOptions};
use crate::storage;
use std::path::PathBuf;

/// Everything `ensure_local` needs, passed explicitly per call.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub credentials: Credentials,
    pub http: HttpOptions,
}

impl FetchContext {
    pub fn from_config(cfg: &SyncConfig, credentials: Credentials) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            download_dir: cfg.download_dir.clone(),
            credentials,
            http: cfg.http_options(),
        }
    }

    /// `base_url + download_url`, with `username` and `token` query parameters.
    pub fn artifact_url(&self, release: &LatestRelease) -> Result<String> {
        let raw = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            release.download_url
        );
        let mut url = url::Url::parse(&raw).map_err(|source| SyncError::Url {
            url: raw.clone(),
            source,
        })?;
        url.query_pairs_mut()
            .append_pair("username", &self.credentials.username)
            .append_pair("token", &self.credentials.token);
        Ok(url.into())
    }

    /// Where the artifact for `release` lives, after checking its file name.
    pub fn artifact_path(&self, entry_name: &str, release: &LatestRelease) -> Result<PathBuf> {
        let name = storage::checked_file_name(&release.file_name).map_err(|reason| {
            SyncError::MalformedEntry {
                name: Some(entry_name.to_string()),
                reason,
            }
        })?;
        Ok(self.download_dir.join(name))
    }
}

/// Ensure the artifact for `entry` exists locally with its declared hash.
///
/// Returns `Err` only for failures that prevented a decision (network,
/// filesystem, unsafe file name); a hash mismatch is an `Ok` outcome.
pub fn ensure_local(entry: &CatalogEntry, ctx: &FetchContext) -> Result<FetchOutcome> {
    let Some(release) = entry.latest_release.as_ref() else {
        tracing::debug!(name = %entry.name, "no latest release, skipping");
        return Ok(FetchOutcome::Skipped(SkipReason::NoRelease));
    };
    let path = ctx.artifact_path(&entry.name, release)?;

    let mut replaced_corrupt = false;
    if let Some(local) = checksum::hash_of(&path)? {
        if checksum::digests_match(&local, &release.sha1) {
            tracing::debug!(
                "mod '{}' already downloaded, keeping local file: {}",
                entry.name,
                path.display()
            );
            return Ok(FetchOutcome::AlreadyPresent);
        }
        tracing::debug!(
            "mod '{}' local sha1 {} != declared {}, removing {}",
            entry.name,
            local,
            release.sha1,
            path.display()
        );
        storage::remove_if_exists(&path)?;
        replaced_corrupt = true;
    } else {
        tracing::debug!("{} not found, retrieving", release.file_name);
    }

    let url = ctx.artifact_url(release)?;
    let temp = storage::temp_path(&path);
    let bytes = http::get_to_file(&url, &temp, &ctx.http)?;

    let actual = match checksum::hash_of(&temp) {
        Ok(Some(h)) => h,
        Ok(None) => {
            return Err(SyncError::io(
                "hash",
                &temp,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ))
        }
        Err(e) => {
            storage::remove_if_exists(&temp)?;
            return Err(e);
        }
    };

    if checksum::digests_match(&actual, &release.sha1) {
        storage::promote(&temp, &path)?;
        tracing::debug!(bytes, "mod '{}' sha1 matches, keeping {}", entry.name, path.display());
        Ok(FetchOutcome::Downloaded {
            bytes,
            replaced_corrupt,
        })
    } else {
        storage::remove_if_exists(&temp)?;
        tracing::warn!(
            "mod '{}' sha1 doesn't match catalog: expected {}, got {}",
            entry.name,
            release.sha1,
            actual
        );
        Ok(FetchOutcome::IntegrityMismatch {
            expected: release.sha1.clone(),
            actual,
        })
    }
}

/// Local state of an entry's artifact, determined without network access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    /// File exists and matches the declared hash.
    Present,
    Missing,
    /// File exists with a different hash; the next sync replaces it.
    Stale,
    NoRelease,
}

impl LocalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalState::Present => "present",
            LocalState::Missing => "missing",
            LocalState::Stale => "stale",
            LocalState::NoRelease => "norelease",
        }
    }
}

/// Inspect the artifact for `entry` without modifying anything.
pub fn local_state(entry: &CatalogEntry, ctx: &FetchContext) -> Result<LocalState> {
    let Some(release) = entry.latest_release.as_ref() else {
        return Ok(LocalState::NoRelease);
    };
    let path = ctx.artifact_path(&entry.name, release)?;
    Ok(match checksum::hash_of(&path)? {
        None => LocalState::Missing,
        Some(h) if checksum::digests_match(&h, &release.sha1) => LocalState::Present,
        Some(_) => LocalState::Stale,
    })
}
