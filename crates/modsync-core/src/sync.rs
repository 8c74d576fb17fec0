//! Batch driver: refresh the catalog, then fetch entries one at a time.
//!
//! Item-level errors become `FetchOutcome`s collected into a `SyncSummary`;
//! only catalog-level errors abort the run.

use crate::catalog::{CatalogDocument, CatalogSync};
use crate::config::{Credentials, SyncConfig};
use crate::control::CancelToken;
use crate::error::{Result, SyncError};
use crate::fetcher::{self, FetchContext, FetchOutcome};
use crate::storage;
use std::time::Duration;

/// Per-run knobs supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Pause after each item that went to the network.
    pub item_pause: Duration,
    /// Stop after this many entries (after `only` filtering).
    pub limit: Option<usize>,
    /// If non-empty, only entries with these names are processed.
    pub only: Vec<String>,
}

impl SyncOptions {
    pub fn from_config(cfg: &SyncConfig) -> Self {
        Self {
            item_pause: cfg.item_pause(),
            ..Self::default()
        }
    }

    fn wants(&self, name: Option<&str>) -> bool {
        self.only.is_empty() || name.is_some_and(|n| self.only.iter().any(|o| o == n))
    }
}

/// Outcome for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Entry name, or `None` for entries too malformed to have one.
    pub name: Option<String>,
    pub outcome: FetchOutcome,
}

/// Everything a run did, for the caller to report or act on.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub items: Vec<ItemReport>,
    /// The run stopped early on request.
    pub cancelled: bool,
}

/// Per-kind tallies of a `SyncSummary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    pub present: usize,
    pub downloaded: usize,
    pub mismatched: usize,
    pub skipped: usize,
    pub transient: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn counts(&self) -> SummaryCounts {
        let mut c = SummaryCounts::default();
        for item in &self.items {
            match item.outcome {
                FetchOutcome::AlreadyPresent => c.present += 1,
                FetchOutcome::Downloaded { .. } => c.downloaded += 1,
                FetchOutcome::IntegrityMismatch { .. } => c.mismatched += 1,
                FetchOutcome::Skipped(_) => c.skipped += 1,
                FetchOutcome::TransientFailure { .. } => c.transient += 1,
                FetchOutcome::Failed { .. } => c.failed += 1,
            }
        }
        c
    }

    /// Items that ended without a verified artifact, skips excluded.
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|i| {
            !i.outcome.is_verified() && !matches!(i.outcome, FetchOutcome::Skipped(_))
        })
    }

    pub fn all_verified(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Process catalog entries in order, one at a time.
pub fn fetch_all(
    doc: &CatalogDocument,
    ctx: &FetchContext,
    opts: &SyncOptions,
    cancel: &CancelToken,
) -> SyncSummary {
    let mut summary = SyncSummary::default();
    let mut processed = 0usize;
    let mut pause_pending = false;

    for decoded in doc.entries() {
        let name = match &decoded {
            Ok(entry) => Some(entry.name.clone()),
            Err(SyncError::MalformedEntry { name, .. }) => name.clone(),
            Err(_) => None,
        };
        if !opts.wants(name.as_deref()) {
            continue;
        }
        if opts.limit.is_some_and(|l| processed >= l) {
            break;
        }
        if pause_pending && cancel.sleep(opts.item_pause) {
            summary.cancelled = true;
            break;
        }
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let result = decoded.and_then(|entry| fetcher::ensure_local(&entry, ctx));
        pause_pending = went_to_network(&result);
        // Mismatches are warned about by the fetcher; successes stay at debug.
        let outcome = match result {
            Ok(o) => {
                tracing::debug!("mod {:?}: {}", name.as_deref().unwrap_or(""), o);
                o
            }
            Err(e) => {
                tracing::warn!("mod {:?}: {}", name.as_deref().unwrap_or("<unnamed>"), e);
                FetchOutcome::from_error(&e)
            }
        };
        summary.items.push(ItemReport { name, outcome });
        processed += 1;
    }

    if summary.cancelled {
        tracing::info!("interrupted, stopping after {} item(s)", processed);
    }
    summary
}

/// Whether handling this item made (or tried to make) a request.
fn went_to_network(result: &Result<FetchOutcome>) -> bool {
    match result {
        Ok(o) => matches!(
            o,
            FetchOutcome::Downloaded { .. } | FetchOutcome::IntegrityMismatch { .. }
        ),
        Err(e) => matches!(
            e,
            SyncError::Transport { .. } | SyncError::Http { .. }
        ),
    }
}

/// Full run: bootstrap directories, refresh the catalog, fetch every entry.
pub fn run(
    cfg: &SyncConfig,
    credentials: Credentials,
    opts: &SyncOptions,
    cancel: &CancelToken,
) -> Result<SyncSummary> {
    storage::ensure_dirs([&cfg.cache_dir, &cfg.download_dir])?;
    let swept = storage::sweep_partials(&cfg.download_dir)?;
    if swept > 0 {
        tracing::debug!("removed {} partial download(s) from an earlier run", swept);
    }

    let doc = CatalogSync::from_config(cfg).refresh()?;
    let ctx = FetchContext::from_config(cfg, credentials);
    let summary = fetch_all(&doc, &ctx, opts, cancel);

    let c = summary.counts();
    tracing::debug!(
        present = c.present,
        downloaded = c.downloaded,
        mismatched = c.mismatched,
        skipped = c.skipped,
        transient = c.transient,
        failed = c.failed,
        "sync finished"
    );
    Ok(summary)
}
