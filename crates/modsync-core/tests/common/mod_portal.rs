//! Minimal HTTP/1.1 server standing in for the mod portal in integration tests.
//!
//! Serves fixed bodies per request path (query ignored for routing) and
//! records every request target so tests can assert on network traffic.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct ModPortal {
    base_url: String,
    routes: Routes,
    hits: Arc<Mutex<Vec<String>>>,
}

impl ModPortal {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let hits = Arc::new(Mutex::new(Vec::new()));
        let (r, h) = (Arc::clone(&routes), Arc::clone(&hits));
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let (r, h) = (Arc::clone(&r), Arc::clone(&h));
                thread::spawn(move || handle(stream, &r, &h));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            routes,
            hits,
        }
    }

    /// Origin without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serve `body` with `status` for GETs of `path`.
    pub fn set(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                status,
                body: body.into(),
            },
        );
    }

    /// Request targets (path and query) received so far, in order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Number of requests whose path equals `path`.
    pub fn hit_count(&self, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|t| t.split('?').next() == Some(path))
            .count()
    }
}

fn handle(mut stream: TcpStream, routes: &Routes, hits: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut req = Vec::new();
    let mut buf = [0u8; 4096];
    while !req.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => req.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&req);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/").to_string();
    hits.lock().unwrap().push(target.clone());

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    let path = target.split('?').next().unwrap_or("/");
    let route = routes.lock().unwrap().get(path).cloned().unwrap_or(Route {
        status: 404,
        body: b"not found".to_vec(),
    });
    let head = format!(
        "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
}
