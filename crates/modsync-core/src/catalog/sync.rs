//! Conditional refresh of the cached catalog.
//!
//! The remote listing is always fetched into a temp sibling first. The live
//! cache is replaced only when the fetched bytes hash differently, and only
//! after they parse as a catalog.

use super::model::CatalogDocument;
use crate::checksum;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::http::{self, HttpOptions};
use crate::storage;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the live catalog cache inside the cache directory.
pub const CACHE_FILE_NAME: &str = "mod-list.json";
/// Fetch target before promotion; never read as a catalog on its own.
pub const TEMP_FILE_NAME: &str = "mod-list-new.json";

/// What a refresh did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogChange {
    /// No cache existed; the fetched document became the cache.
    Bootstrapped { hash: String },
    /// Remote bytes matched the cache; nothing was written.
    Unchanged { hash: String },
    /// Remote bytes differed; the cache was replaced.
    Updated { old: String, new: String },
}

/// Owns the catalog cache file.
#[derive(Debug, Clone)]
pub struct CatalogSync {
    catalog_url: String,
    cache_dir: PathBuf,
    http: HttpOptions,
}

impl CatalogSync {
    pub fn new(catalog_url: impl Into<String>, cache_dir: impl Into<PathBuf>, http: HttpOptions) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            cache_dir: cache_dir.into(),
            http,
        }
    }

    pub fn from_config(cfg: &SyncConfig) -> Self {
        Self::new(cfg.catalog_url(), &cfg.cache_dir, cfg.http_options())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    pub fn temp_path(&self) -> PathBuf {
        self.cache_dir.join(TEMP_FILE_NAME)
    }

    /// Bring the cache in line with the remote catalog and return it.
    pub fn refresh(&self) -> Result<CatalogDocument> {
        self.refresh_with_change().map(|(doc, _)| doc)
    }

    /// Like `refresh`, also reporting whether the cache was created, kept or replaced.
    ///
    /// On error the previous cache (if any) is untouched and no temp file remains.
    pub fn refresh_with_change(&self) -> Result<(CatalogDocument, CatalogChange)> {
        let live = self.cache_path();
        let temp = self.temp_path();

        let cached_hash = checksum::hash_of(&live)?;
        if cached_hash.is_none() {
            tracing::info!(
                "no {} found, retrieving {}",
                live.display(),
                self.catalog_url
            );
        }

        http::get_to_file(&self.catalog_url, &temp, &self.http)?;
        let fetched_hash = match checksum::hash_of(&temp) {
            Ok(Some(h)) => h,
            Ok(None) => {
                return Err(SyncError::io(
                    "hash",
                    &temp,
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ))
            }
            Err(e) => {
                discard(&temp);
                return Err(e);
            }
        };

        match cached_hash {
            None => {
                let doc = parse_or_discard(&temp, fetched_hash.clone())?;
                storage::promote(&temp, &live)?;
                tracing::info!(
                    sha1 = %fetched_hash,
                    entries = doc.len(),
                    "downloaded {}",
                    live.display()
                );
                Ok((doc, CatalogChange::Bootstrapped { hash: fetched_hash }))
            }
            Some(old) if old == fetched_hash => {
                tracing::debug!("catalog unchanged, old: {} == new: {}", old, fetched_hash);
                storage::remove_if_exists(&temp)?;
                let doc = load(&live, old.clone())?;
                Ok((doc, CatalogChange::Unchanged { hash: old }))
            }
            Some(old) => {
                tracing::debug!("catalog changed, old: {} -> new: {}", old, fetched_hash);
                let doc = parse_or_discard(&temp, fetched_hash.clone())?;
                storage::promote(&temp, &live)?;
                tracing::debug!(entries = doc.len(), "catalog cache updated");
                Ok((
                    doc,
                    CatalogChange::Updated {
                        old,
                        new: fetched_hash,
                    },
                ))
            }
        }
    }

    /// The cached catalog without touching the network, or `None` if there is none yet.
    pub fn load_cached(&self) -> Result<Option<CatalogDocument>> {
        let live = self.cache_path();
        match checksum::hash_of(&live)? {
            Some(hash) => load(&live, hash).map(Some),
            None => Ok(None),
        }
    }
}

fn load(path: &Path, hash: String) -> Result<CatalogDocument> {
    let bytes = fs::read(path).map_err(|e| SyncError::io("read", path, e))?;
    CatalogDocument::from_slice(&bytes, path, hash)
}

/// Parse the fetched temp copy; a corrupt fetch is deleted so it cannot be promoted later.
fn parse_or_discard(temp: &Path, hash: String) -> Result<CatalogDocument> {
    load(temp, hash).inspect_err(|_| discard(temp))
}

fn discard(temp: &Path) {
    if let Err(e) = storage::remove_if_exists(temp) {
        tracing::warn!("could not remove {}: {}", temp.display(), e);
    }
}
