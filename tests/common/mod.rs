//! In-process stand-in for the Injective REST gateway.
//!
//! Routes are keyed by path plus query string and can be swapped between
//! cycles. Unknown routes answer 404. Every request is counted per route.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use peggo_exporter::api::endpoints;
use peggo_exporter::Config;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const ADDRESS: &str = "inj1orchestratortest";

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

pub struct MockApi {
    addr: SocketAddr,
    shared: Shared,
}

impl MockApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Shared::default();
        let accept_shared = shared.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else { break };
                let shared = accept_shared.clone();
                tokio::spawn(async move {
                    let _ = respond(stream, shared).await;
                });
            }
        });
        Self { addr, shared }
    }

    /// API node that is synced and reports the given values.
    pub async fn healthy(observed: u64, claimed: u64, valsets: usize, batches: usize) -> Self {
        let api = Self::start().await;
        api.set_json(endpoints::SYNCING, json!({"syncing": false}));
        api.set_values(observed, claimed, valsets, batches);
        api
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set(&self, path: &str, status: u16, body: &str) {
        self.shared.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                status,
                body: body.to_string(),
                delay: Duration::ZERO,
            },
        );
    }

    pub fn set_json(&self, path: &str, body: Value) {
        self.set(path, 200, &body.to_string());
    }

    pub fn set_delay(&self, path: &str, delay: Duration) {
        if let Some(route) = self.shared.routes.lock().unwrap().get_mut(path) {
            route.delay = delay;
        }
    }

    pub fn remove(&self, path: &str) {
        self.shared.routes.lock().unwrap().remove(path);
    }

    pub fn set_values(&self, observed: u64, claimed: u64, valsets: usize, batches: usize) {
        self.set_json(
            endpoints::MODULE_STATE,
            json!({"state": {"last_observed_nonce": observed.to_string(), "params": {}}}),
        );
        self.set_json(
            &endpoints::oracle_event(ADDRESS),
            json!({"last_claim_event": {"ethereum_event_nonce": claimed, "ethereum_event_height": "100"}}),
        );
        self.set_json(
            &endpoints::last_pending_valsets(ADDRESS),
            json!({"valsets": vec![json!({"nonce": "1"}); valsets]}),
        );
        self.set_json(
            &endpoints::last_pending_batches(ADDRESS),
            json!({"batches": vec![json!({"batch_nonce": "1"}); batches]}),
        );
    }

    pub fn hits(&self, path: &str) -> usize {
        self.shared.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.shared.hits.lock().unwrap().values().sum()
    }

    pub fn extraction_hits(&self) -> usize {
        self.total_hits() - self.hits(endpoints::SYNCING)
    }
}

async fn respond(mut stream: TcpStream, shared: Shared) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    *shared.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
    let route = shared.routes.lock().unwrap().get(&path).cloned();

    let (status, body, delay) = match route {
        Some(r) => (r.status, r.body, r.delay),
        None => (404, "Not Found".to_string(), Duration::ZERO),
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

pub fn config(api_url: String, request_timeout: Duration) -> Arc<Config> {
    Arc::new(Config {
        api_url,
        orchestrator_address: ADDRESS.to_string(),
        polling_interval: Duration::from_secs(60),
        request_timeout,
        listen_addr: "127.0.0.1".parse().unwrap(),
        exporter_port: 0,
        log_level: "info".to_string(),
    })
}
