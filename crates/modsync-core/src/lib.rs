pub mod config;
pub mod logging;

pub mod catalog;
pub mod checksum;
pub mod control;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod storage;
pub mod sync;

pub use catalog::{CatalogChange, CatalogDocument, CatalogEntry, CatalogSync, LatestRelease};
pub use config::{Credentials, SyncConfig};
pub use control::CancelToken;
pub use error::SyncError;
pub use fetcher::{ensure_local, FetchContext, FetchOutcome};
pub use sync::{SyncOptions, SyncSummary};
