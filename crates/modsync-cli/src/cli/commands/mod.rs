//! CLI command handlers, one per file.

mod checksum;
mod refresh;
mod status;
mod sync;

pub use checksum::run_checksum;
pub use refresh::run_refresh;
pub use status::run_status;
pub use sync::run_sync;

#[cfg(test)]
pub use status::{status_lines, StatusTally};
