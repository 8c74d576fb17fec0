//! Per-item results of `ensure_local`.

use crate::error::SyncError;
use std::fmt;

/// What happened to one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Local file already matched the declared hash; no network call was made.
    AlreadyPresent,
    /// Downloaded and verified. `replaced_corrupt` is set when a local file
    /// with the wrong hash was deleted first.
    Downloaded { bytes: u64, replaced_corrupt: bool },
    /// Downloaded bytes did not match the declared hash and were deleted.
    IntegrityMismatch { expected: String, actual: String },
    /// Entry has nothing to fetch.
    Skipped(SkipReason),
    /// Network-level failure (timeout, connection, 429/5xx); a later run may succeed.
    TransientFailure { error: String },
    /// Anything else: malformed entry, HTTP 4xx, filesystem error.
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry has no `latest_release`.
    NoRelease,
}

impl FetchOutcome {
    /// The artifact is present on disk with the declared hash.
    pub fn is_verified(&self) -> bool {
        matches!(
            self,
            FetchOutcome::AlreadyPresent | FetchOutcome::Downloaded { .. }
        )
    }

    /// Classify an item-level error into a failure outcome.
    pub fn from_error(err: &SyncError) -> Self {
        if err.is_transient() {
            FetchOutcome::TransientFailure {
                error: err.to_string(),
            }
        } else {
            FetchOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::AlreadyPresent => write!(f, "already present"),
            FetchOutcome::Downloaded {
                bytes,
                replaced_corrupt,
            } => {
                write!(f, "downloaded {} bytes", bytes)?;
                if *replaced_corrupt {
                    write!(f, " (replaced corrupt local copy)")?;
                }
                Ok(())
            }
            FetchOutcome::IntegrityMismatch { expected, actual } => {
                write!(f, "sha1 mismatch: expected {}, got {}", expected, actual)
            }
            FetchOutcome::Skipped(SkipReason::NoRelease) => write!(f, "skipped: no release"),
            FetchOutcome::TransientFailure { error } => write!(f, "transient failure: {}", error),
            FetchOutcome::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}
