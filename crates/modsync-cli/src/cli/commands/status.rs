//! `modsync status` – show local state of every mod in the cached catalog.

use anyhow::{Context, Result};
use modsync_core::catalog::{CatalogDocument, CatalogSync};
use modsync_core::config::SyncConfig;
use modsync_core::fetcher::{self, FetchContext, LocalState};
use modsync_core::{Credentials, SyncError};

/// Per-state counts printed after the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    pub present: u32,
    pub missing: u32,
    pub stale: u32,
    pub other: u32,
}

pub fn run_status(cfg: &SyncConfig, only: &[String]) -> Result<()> {
    let sync = CatalogSync::from_config(cfg);
    let doc = sync.load_cached()?.with_context(|| {
        format!(
            "no cached catalog at {}; run `modsync refresh` first",
            sync.cache_path().display()
        )
    })?;
    let ctx = FetchContext::from_config(cfg, Credentials::default());

    let (lines, t) = status_lines(&doc, &ctx, only);
    for line in &lines {
        println!("{}", line);
    }
    println!(
        "{} present, {} missing, {} stale, {} other",
        t.present, t.missing, t.stale, t.other
    );
    Ok(())
}

/// One line per selected entry; `only` applies to malformed entries too.
pub fn status_lines(
    doc: &CatalogDocument,
    ctx: &FetchContext,
    only: &[String],
) -> (Vec<String>, StatusTally) {
    let mut lines = Vec::new();
    let mut t = StatusTally::default();
    for decoded in doc.entries() {
        let name = match &decoded {
            Ok(entry) => Some(entry.name.as_str()),
            Err(SyncError::MalformedEntry { name, .. }) => name.as_deref(),
            Err(_) => None,
        };
        if !only.is_empty() && !name.is_some_and(|n| only.iter().any(|o| o == n)) {
            continue;
        }
        let entry = match decoded {
            Ok(e) => e,
            Err(e) => {
                t.other += 1;
                lines.push(format!("{:<9} {}", "malformed", e));
                continue;
            }
        };
        let state = match fetcher::local_state(&entry, ctx) {
            Ok(s) => s,
            Err(e) => {
                t.other += 1;
                lines.push(format!("{:<9} {}: {}", "error", entry.name, e));
                continue;
            }
        };
        match state {
            LocalState::Present => t.present += 1,
            LocalState::Missing => t.missing += 1,
            LocalState::Stale => t.stale += 1,
            LocalState::NoRelease => t.other += 1,
        }
        let file = entry
            .latest_release
            .as_ref()
            .map(|r| r.file_name.as_str())
            .unwrap_or("-");
        lines.push(format!("{:<9} {:<40} {}", state.as_str(), entry.name, file));
    }
    (lines, t)
}
