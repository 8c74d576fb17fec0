//! Error taxonomy for catalog refresh and artifact fetches.
//!
//! Catalog-level variants are fatal for a run; the sync driver turns
//! item-level variants into a `FetchOutcome` so the batch keeps going.

use std::path::PathBuf;

/// Result alias used throughout the core.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// libcurl failed before a response was received (DNS, connect, timeout, reset).
    #[error("transfer of {url} failed: {source}")]
    Transport {
        url: String,
        /// True for timeouts and connection-level failures worth trying again later.
        transient: bool,
        #[source]
        source: curl::Error,
    },

    /// Server answered with a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    /// Catalog body is not JSON or lacks a `results` array.
    #[error("catalog at {path} is corrupt: {reason}")]
    CorruptCatalog { path: PathBuf, reason: String },

    /// One catalog entry could not be used (missing fields, unsafe file name).
    #[error("malformed catalog entry {name:?}: {reason}")]
    MalformedEntry { name: Option<String>, reason: String },

    /// Base URL or download path could not be turned into a request URL.
    #[error("invalid URL {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Wraps an I/O error with the operation and path it happened on.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether the failure is network-level and likely to clear up on a later run.
    ///
    /// 429 and 5xx responses count as transient alongside curl timeouts and
    /// connection errors.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Transport { transient, .. } => *transient,
            SyncError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}
