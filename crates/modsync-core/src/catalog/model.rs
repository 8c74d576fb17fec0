//! Catalog document and entry types, as served by the mod portal.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One package in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique mod name.
    pub name: String,
    pub title: String,
    pub owner: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub downloads_count: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Absent (or `null`) for mods with no published release.
    #[serde(default)]
    pub latest_release: Option<LatestRelease>,
}

/// The release an entry points at; its `sha1` is the integrity reference
/// for the downloaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRelease {
    /// Path relative to the portal base URL, e.g. `/download/Age2Taunts/616a...`.
    pub download_url: String,
    pub file_name: String,
    /// Declared lowercase hex SHA-1 of the artifact.
    pub sha1: String,
    pub version: String,
    #[serde(default)]
    pub released_at: Option<String>,
}

#[derive(Deserialize)]
struct Listing {
    results: Vec<serde_json::Value>,
}

/// The full catalog listing, in server order.
///
/// Entries are kept as raw JSON and decoded one at a time, so a single bad
/// entry surfaces as an item-level error instead of rejecting the document.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    entries: Vec<serde_json::Value>,
    hash: String,
}

impl CatalogDocument {
    /// Parse catalog bytes; `path` and `hash` describe where they came from.
    pub fn from_slice(bytes: &[u8], path: &Path, hash: String) -> Result<Self> {
        let listing: Listing =
            serde_json::from_slice(bytes).map_err(|e| SyncError::CorruptCatalog {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            entries: listing.results,
            hash,
        })
    }

    /// SHA-1 of the serialized document this was parsed from.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode every entry, in order. Each item is independent.
    pub fn entries(&self) -> impl Iterator<Item = Result<CatalogEntry>> + '_ {
        self.entries.iter().map(decode_entry)
    }
}

/// Decode one raw entry, keeping its `name` in the error when it has one.
pub fn decode_entry(value: &serde_json::Value) -> Result<CatalogEntry> {
    CatalogEntry::deserialize(value).map_err(|e| SyncError::MalformedEntry {
        name: value
            .get("name")
            .and_then(|n| n.as_str())
            .map(str::to_string),
        reason: e.to_string(),
    })
}
