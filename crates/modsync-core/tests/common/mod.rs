#![allow(dead_code)]

pub mod mod_portal;

use sha1::{Digest, Sha1};

pub const CATALOG_PATH: &str = "/api/mods";

pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// One catalog entry pointing at `/download/{name}/1` with the given declared hash.
pub fn entry(name: &str, declared_sha1: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "title": name,
        "owner": "tester",
        "latest_release": {
            "download_url": format!("/download/{}/1", name),
            "file_name": format!("{}_1.0.0.zip", name),
            "sha1": declared_sha1,
            "version": "1.0.0"
        }
    })
}

pub fn catalog(entries: Vec<serde_json::Value>) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "results": entries })).unwrap()
}
