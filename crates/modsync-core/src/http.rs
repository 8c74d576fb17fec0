//! Blocking HTTP GET into a file.
//!
//! One libcurl easy handle per request; the response body is streamed to
//! disk as it arrives. Runs on the calling thread.

use crate::error::{Result, SyncError};
use crate::storage;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer limit; large mod archives need a generous value.
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
        }
    }
}

const USER_AGENT: &str = concat!("modsync/", env!("CARGO_PKG_VERSION"));

/// GET `url` and write the body to `dest` (created or truncated).
/// Returns the number of bytes written.
///
/// On any failure `dest` is removed, so callers never see a half-written file.
pub fn get_to_file(url: &str, dest: &Path, opts: &HttpOptions) -> Result<u64> {
    let res = transfer_to_file(url, dest, opts);
    if res.is_err() {
        if let Err(e) = storage::remove_if_exists(dest) {
            tracing::warn!("could not remove failed download {}: {}", dest.display(), e);
        }
    }
    res
}

fn transfer_to_file(url: &str, dest: &Path, opts: &HttpOptions) -> Result<u64> {
    let shown = redact(url);
    let file = File::create(dest).map_err(|e| SyncError::io("create", dest, e))?;
    let mut out = BufWriter::new(file);
    let mut written = 0u64;
    let mut write_err: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    let setup = |easy: &mut curl::easy::Easy| -> std::result::Result<(), curl::Error> {
        easy.url(url)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(opts.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(opts.timeout)?;
        Ok(())
    };
    setup(&mut easy).map_err(|e| curl_error(&shown, e))?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(|e| curl_error(&shown, e))?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(SyncError::io("write", dest, e));
    }
    performed.map_err(|e| curl_error(&shown, e))?;

    let status = easy.response_code().map_err(|e| curl_error(&shown, e))?;
    if !(200..300).contains(&status) {
        return Err(SyncError::Http { url: shown, status });
    }

    let file = out
        .into_inner()
        .map_err(|e| SyncError::io("write", dest, e.into_error()))?;
    file.sync_all().map_err(|e| SyncError::io("sync", dest, e))?;
    Ok(written)
}

fn curl_error(url: &str, e: curl::Error) -> SyncError {
    SyncError::Transport {
        url: url.to_string(),
        transient: is_transient_curl_error(&e),
        source: e,
    }
}

/// Timeouts and connection-level failures; anything else is treated as permanent.
pub fn is_transient_curl_error(e: &curl::Error) -> bool {
    e.is_operation_timedout()
        || e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
}

/// URL with the `token` query value masked, safe for logs and error messages.
pub fn redact(raw: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(raw) else {
        return raw.to_string();
    };
    if !parsed.query_pairs().any(|(k, _)| k == "token") {
        return raw.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}
