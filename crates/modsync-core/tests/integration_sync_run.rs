//! Integration test: a full run against a local portal, then a second idempotent run.

mod common;

use common::mod_portal::ModPortal;
use common::{catalog, entry, sha1_hex, CATALOG_PATH};
use modsync_core::fetcher::{FetchOutcome, SkipReason};
use modsync_core::sync::{self, SyncOptions};
use modsync_core::{CancelToken, Credentials, SyncConfig};
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn config(portal: &ModPortal, root: &std::path::Path) -> SyncConfig {
    SyncConfig {
        base_url: portal.base_url().to_string(),
        catalog_path: format!("{}?page_size=max", CATALOG_PATH),
        cache_dir: root.join("mod-list"),
        download_dir: root.join("downloads"),
        item_pause_ms: 0,
        ..SyncConfig::default()
    }
}

#[test]
fn full_run_then_idempotent_rerun() {
    let portal = ModPortal::start();
    let good = b"good mod bytes".to_vec();
    let served_bad = b"tampered bytes".to_vec();
    portal.set("/download/good/1", 200, good.clone());
    portal.set("/download/bad/1", 200, served_bad);
    portal.set("/download/gone/1", 404, b"no".to_vec());
    let no_release = serde_json::json!({"name": "norel", "title": "t", "owner": "o"});
    portal.set(
        CATALOG_PATH,
        200,
        catalog(vec![
            entry("good", &sha1_hex(&good)),
            entry("bad", &sha1_hex(b"what the catalog promised")),
            no_release,
            entry("gone", "00"),
        ]),
    );

    let root = tempdir().unwrap();
    let cfg = config(&portal, root.path());
    let creds = Credentials::new("alice", "tok");
    let opts = SyncOptions::from_config(&cfg);

    let summary = sync::run(&cfg, creds.clone(), &opts, &CancelToken::new()).expect("run");

    assert_eq!(summary.items.len(), 4);
    assert!(matches!(
        summary.items[0].outcome,
        FetchOutcome::Downloaded { .. }
    ));
    assert!(matches!(
        summary.items[1].outcome,
        FetchOutcome::IntegrityMismatch { .. }
    ));
    assert_eq!(
        summary.items[2].outcome,
        FetchOutcome::Skipped(SkipReason::NoRelease)
    );
    assert!(matches!(summary.items[3].outcome, FetchOutcome::Failed { .. }));
    let failed: Vec<_> = summary
        .failures()
        .map(|i| i.name.clone().unwrap())
        .collect();
    assert_eq!(failed, vec!["bad", "gone"]);

    let downloads: Vec<_> = fs::read_dir(&cfg.download_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(downloads, vec!["good_1.0.0.zip"]);
    assert!(cfg.cache_dir.join("mod-list.json").exists());

    // Second run: catalog unchanged, good artifact kept without a request.
    let summary = sync::run(&cfg, creds, &opts, &CancelToken::new()).expect("rerun");
    assert_eq!(summary.items[0].outcome, FetchOutcome::AlreadyPresent);
    assert_eq!(portal.hit_count("/download/good/1"), 1);
    assert_eq!(portal.hit_count(CATALOG_PATH), 2);
}

#[test]
fn run_sweeps_partials_and_creates_dirs() {
    let portal = ModPortal::start();
    portal.set(CATALOG_PATH, 200, catalog(vec![]));
    let root = tempdir().unwrap();
    let cfg = config(&portal, root.path());
    fs::create_dir_all(&cfg.download_dir).unwrap();
    fs::write(cfg.download_dir.join("x_1.0.0.zip.part"), b"half").unwrap();

    let summary = sync::run(
        &cfg,
        Credentials::default(),
        &SyncOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();

    assert!(summary.items.is_empty());
    assert!(summary.all_verified());
    assert!(cfg.cache_dir.is_dir());
    assert!(!cfg.download_dir.join("x_1.0.0.zip.part").exists());
}

#[test]
fn catalog_failure_aborts_run() {
    let portal = ModPortal::start();
    portal.set(CATALOG_PATH, 200, b"[]".to_vec());
    let root = tempdir().unwrap();
    let cfg = config(&portal, root.path());

    let err = sync::run(
        &cfg,
        Credentials::default(),
        &SyncOptions::default(),
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, modsync_core::SyncError::CorruptCatalog { .. }));
    assert_eq!(portal.hits().len(), 1);
}

/// Serves `names` as downloadable mods whose bytes match their declared hash.
fn serve_mods(portal: &ModPortal, names: &[&str]) {
    let mut entries = Vec::new();
    for name in names {
        let body = format!("{} bytes", name).into_bytes();
        entries.push(entry(name, &sha1_hex(&body)));
        portal.set(&format!("/download/{}/1", name), 200, body);
    }
    portal.set(CATALOG_PATH, 200, catalog(entries));
}

#[test]
fn pause_follows_downloads_but_not_local_hits() {
    let portal = ModPortal::start();
    serve_mods(&portal, &["a", "b", "c"]);
    let root = tempdir().unwrap();
    let cfg = SyncConfig {
        item_pause_ms: 300,
        ..config(&portal, root.path())
    };
    let opts = SyncOptions::from_config(&cfg);
    let pause = Duration::from_millis(300);

    let start = Instant::now();
    let summary = sync::run(&cfg, Credentials::default(), &opts, &CancelToken::new()).unwrap();
    assert_eq!(summary.counts().downloaded, 3);
    // Paused between a/b and b/c.
    assert!(start.elapsed() >= pause * 2, "elapsed {:?}", start.elapsed());

    let start = Instant::now();
    let summary = sync::run(&cfg, Credentials::default(), &opts, &CancelToken::new()).unwrap();
    assert_eq!(summary.counts().present, 3);
    assert!(start.elapsed() < pause, "elapsed {:?}", start.elapsed());
}

#[test]
fn cancel_during_pause_stops_after_current_item() {
    let portal = ModPortal::start();
    serve_mods(&portal, &["a", "b", "c"]);
    let root = tempdir().unwrap();
    let cfg = SyncConfig {
        item_pause_ms: 5_000,
        ..config(&portal, root.path())
    };
    let opts = SyncOptions::from_config(&cfg);
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        remote.cancel();
    });

    let start = Instant::now();
    let summary = sync::run(&cfg, Credentials::default(), &opts, &cancel).unwrap();
    canceller.join().unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.items.len(), 1);
    assert!(matches!(summary.items[0].outcome, FetchOutcome::Downloaded { .. }));
    assert!(start.elapsed() < Duration::from_secs(5), "elapsed {:?}", start.elapsed());
    assert_eq!(portal.hit_count("/download/b/1"), 0);
    assert!(cfg.download_dir.join("a_1.0.0.zip").exists());
    assert!(!cfg.download_dir.join("b_1.0.0.zip").exists());
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn default_verbosity_reports_bootstrap_and_failures_only() {
    let portal = ModPortal::start();
    let good = b"good mod bytes".to_vec();
    portal.set("/download/good/1", 200, good.clone());
    portal.set("/download/gone/1", 404, b"no".to_vec());
    portal.set(
        CATALOG_PATH,
        200,
        catalog(vec![entry("good", &sha1_hex(&good)), entry("gone", "00")]),
    );
    let root = tempdir().unwrap();
    let cfg = config(&portal, root.path());

    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let summary = tracing::subscriber::with_default(subscriber, || {
        sync::run(&cfg, Credentials::default(), &SyncOptions::default(), &CancelToken::new())
    })
    .unwrap();
    assert_eq!(summary.counts().downloaded, 1);

    let log = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
    assert!(log.contains("mod-list.json"), "{}", log);
    assert!(log.contains("\"gone\""), "{}", log);
    assert!(!log.contains("\"good\""), "{}", log);
    assert!(!log.contains("sync finished"), "{}", log);
}
