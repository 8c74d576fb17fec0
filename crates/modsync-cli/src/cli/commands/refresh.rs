//! `modsync refresh` – bring the cached catalog up to date.

use anyhow::Result;
use modsync_core::catalog::{CatalogChange, CatalogSync};
use modsync_core::config::SyncConfig;
use modsync_core::storage;

pub fn run_refresh(cfg: &SyncConfig) -> Result<()> {
    storage::ensure_dirs([&cfg.cache_dir, &cfg.download_dir])?;
    let sync = CatalogSync::from_config(cfg);
    let (doc, change) = sync.refresh_with_change()?;
    match change {
        CatalogChange::Bootstrapped { hash } => {
            println!("created {} ({} entries, sha1 {})", sync.cache_path().display(), doc.len(), hash)
        }
        CatalogChange::Unchanged { hash } => {
            println!("catalog unchanged ({} entries, sha1 {})", doc.len(), hash)
        }
        CatalogChange::Updated { old, new } => {
            println!("catalog updated: {} -> {} ({} entries)", old, new, doc.len())
        }
    }
    Ok(())
}
