//! Scrapes against the metrics responder and startup validation of the binary.

use std::process::Command;
use std::time::Duration;

use peggo_exporter::extract::Metric;
use peggo_exporter::{server, ExporterMetrics};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn start_server(metrics: &ExporterMetrics) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, metrics.clone()));
    addr
}

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut out = String::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_string(&mut out))
        .await
        .expect("responder must close the connection")
        .unwrap();
    out
}

#[tokio::test]
async fn scrape_returns_current_gauges() {
    let metrics = ExporterMetrics::new().unwrap();
    metrics.api_status.set(1);
    metrics.set(Metric::ObservedNonce, 4521);
    let addr = start_server(&metrics).await;

    let resp = raw_request(addr, "GET /metrics HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"), "{resp}");
    assert!(resp.contains("Content-Type: text/plain; version=0.0.4"), "{resp}");
    assert!(resp.contains("peggo_api_status 1"), "{resp}");
    assert!(resp.contains("peggo_last_observed_nonce 4521"), "{resp}");
}

#[tokio::test]
async fn scrape_sees_writes_made_after_startup() {
    let metrics = ExporterMetrics::new().unwrap();
    let addr = start_server(&metrics).await;

    metrics.set(Metric::PendingBatches, 2);
    let resp = raw_request(addr, "GET /metrics HTTP/1.1\r\n\r\n").await;

    assert!(resp.contains("peggo_pending_batches 2"), "{resp}");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let metrics = ExporterMetrics::new().unwrap();
    let addr = start_server(&metrics).await;

    let resp = raw_request(addr, "GET /nope HTTP/1.1\r\n\r\n").await;

    assert!(resp.starts_with("HTTP/1.1 404 Not Found\r\n"), "{resp}");
}

#[tokio::test]
async fn garbage_request_is_bad_request() {
    let metrics = ExporterMetrics::new().unwrap();
    let addr = start_server(&metrics).await;

    let resp = raw_request(addr, "\x01\x02\x03 nonsense\r\n\r\n").await;

    assert!(resp.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{resp}");
}

#[tokio::test]
async fn responder_serves_concurrent_scrapes() {
    let metrics = ExporterMetrics::new().unwrap();
    let addr = start_server(&metrics).await;

    let scrapes = (0..8).map(|_| {
        tokio::spawn(async move { raw_request(addr, "GET /metrics HTTP/1.1\r\n\r\n").await })
    });
    for scrape in scrapes.collect::<Vec<_>>() {
        assert!(scrape.await.unwrap().contains("peggo_pending_valsets"));
    }
}

#[test]
fn placeholder_address_exits_before_serving() {
    let output = Command::new(env!("CARGO_BIN_EXE_peggo-exporter"))
        .env_remove("RUST_LOG")
        .env("API_URL", "http://127.0.0.1:1")
        .env("ORCHESTRATOR_ADDRESS", "inj1xxxx")
        .env("EXPORTER_PORT", "0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let logs = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(logs.contains("placeholder"), "{logs}");
    assert!(!logs.contains("serving metrics"), "{logs}");
}

#[test]
fn missing_api_url_exits_before_serving() {
    let output = Command::new(env!("CARGO_BIN_EXE_peggo-exporter"))
        .env_remove("RUST_LOG")
        .env_remove("API_URL")
        .env("ORCHESTRATOR_ADDRESS", "inj1abc")
        .env("EXPORTER_PORT", "0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("serving metrics"));
}
