//! Remote mod catalog: data model and the cached-copy synchronizer.

mod model;
mod sync;

pub use model::{decode_entry, CatalogDocument, CatalogEntry, LatestRelease};
pub use sync::{CatalogChange, CatalogSync, CACHE_FILE_NAME, TEMP_FILE_NAME};
