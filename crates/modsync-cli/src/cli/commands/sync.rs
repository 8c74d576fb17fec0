//! `modsync sync` – refresh the catalog and fetch missing or stale mods.

use anyhow::Result;
use modsync_core::config::{Credentials, SyncConfig};
use modsync_core::control::{self, CancelToken};
use modsync_core::sync::{self, SyncOptions};

pub fn run_sync(
    cfg: &SyncConfig,
    credentials: Credentials,
    limit: Option<usize>,
    only: Vec<String>,
) -> Result<()> {
    if credentials.username.is_empty() || credentials.token.is_empty() {
        tracing::warn!("no username/token configured; the portal will refuse downloads");
    }
    if let Err(e) = control::install_interrupt_handler() {
        tracing::warn!("could not install interrupt handler: {}", e);
    }

    let opts = SyncOptions {
        limit,
        only,
        ..SyncOptions::from_config(cfg)
    };
    let summary = sync::run(cfg, credentials, &opts, &CancelToken::new())?;

    let c = summary.counts();
    println!(
        "{} present, {} downloaded, {} skipped, {} mismatched, {} transient, {} failed",
        c.present, c.downloaded, c.skipped, c.mismatched, c.transient, c.failed
    );
    for item in summary.failures() {
        println!(
            "  {}: {}",
            item.name.as_deref().unwrap_or("<unnamed>"),
            item.outcome
        );
    }
    if summary.cancelled {
        anyhow::bail!("interrupted after {} item(s)", summary.items.len());
    }
    if !summary.all_verified() {
        anyhow::bail!("{} mod(s) not verified", summary.failures().count());
    }
    Ok(())
}
