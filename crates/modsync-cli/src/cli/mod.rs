//! CLI for the modsync catalog synchronizer.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use modsync_core::checksum::HashAlgorithm;
use modsync_core::config::{self, Credentials, SyncConfig};
use std::path::PathBuf;

use commands::{run_checksum, run_refresh, run_status, run_sync};

/// Top-level CLI for modsync.
#[derive(Debug, Parser)]
#[command(name = "modsync")]
#[command(about = "modsync: keep a local mirror of the mod portal, verified by SHA-1", long_about = None)]
pub struct Cli {
    /// Show hash comparisons and per-item decisions.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to ~/.local/state/modsync/modsync.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides for the directories in config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct DirArgs {
    /// Directory holding mod-list.json.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
    /// Directory holding downloaded mods.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,
}

impl DirArgs {
    fn apply(&self, cfg: &mut SyncConfig) {
        if let Some(d) = &self.cache_dir {
            cfg.cache_dir = d.clone();
        }
        if let Some(d) = &self.download_dir {
            cfg.download_dir = d.clone();
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Refresh the catalog, then download every missing or stale mod.
    Sync {
        /// Mod portal username (overrides config).
        #[arg(long)]
        username: Option<String>,
        /// Mod portal token (overrides config).
        #[arg(long)]
        token: Option<String>,
        #[command(flatten)]
        dirs: DirArgs,
        /// Process at most N catalog entries.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Only process the named mod (repeatable).
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
        /// Milliseconds to wait after each download (overrides config).
        #[arg(long, value_name = "MS")]
        pause_ms: Option<u64>,
    },

    /// Refresh the cached catalog only.
    Refresh {
        #[command(flatten)]
        dirs: DirArgs,
    },

    /// Show which mods in the cached catalog are present, missing, or stale.
    Status {
        #[command(flatten)]
        dirs: DirArgs,
        /// Only report the named mod (repeatable).
        #[arg(long = "only", value_name = "NAME")]
        only: Vec<String>,
    },

    /// Compute the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
        /// sha1 (what the catalog declares) or sha256.
        #[arg(long, default_value = "sha1")]
        algorithm: HashAlgorithm,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, algorithm),
            CliCommand::Sync {
                username,
                token,
                dirs,
                limit,
                only,
                pause_ms,
            } => {
                let mut cfg = load_config(&dirs)?;
                if let Some(ms) = pause_ms {
                    cfg.item_pause_ms = ms;
                }
                let creds = credentials(&cfg, username, token);
                run_sync(&cfg, creds, limit, only)
            }
            CliCommand::Refresh { dirs } => run_refresh(&load_config(&dirs)?),
            CliCommand::Status { dirs, only } => run_status(&load_config(&dirs)?, &only),
        }
    }
}

fn load_config(dirs: &DirArgs) -> Result<SyncConfig> {
    let mut cfg = config::load_or_init()?;
    dirs.apply(&mut cfg);
    tracing::debug!(
        base_url = %cfg.base_url,
        cache_dir = %cfg.cache_dir.display(),
        download_dir = %cfg.download_dir.display(),
        "loaded config"
    );
    Ok(cfg)
}

/// CLI flags win over config values; missing values become empty strings.
fn credentials(cfg: &SyncConfig, username: Option<String>, token: Option<String>) -> Credentials {
    let from_cfg = cfg.credentials();
    Credentials::new(
        username.unwrap_or(from_cfg.username),
        token.unwrap_or(from_cfg.token),
    )
}

#[cfg(test)]
mod tests;
