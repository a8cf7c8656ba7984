//! Minimal HTTP responder exposing the gauge registry to Prometheus.
//!
//! One task per connection, one request per connection. The responder only
//! reads the registry, so a scrape never waits on the poll loop.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::metrics::{ExporterMetrics, CONTENT_TYPE};

/// Largest request head accepted. Scrape requests are a few hundred bytes.
const MAX_REQUEST_BYTES: usize = 8192;
const MAX_HEADERS: usize = 32;
/// Clients that connect and never send a full request are dropped after this.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A fully-formed reply to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    pub body: String,
    /// `false` for HEAD: headers are sent, the body is not.
    pub send_body: bool,
}

impl Response {
    fn text(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
            send_body: true,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason,
            self.content_type,
            self.body.len(),
        )
        .into_bytes();
        if self.send_body {
            out.extend_from_slice(self.body.as_bytes());
        }
        out
    }
}

/// Map a request line onto a response.
pub fn route(method: &str, path: &str, metrics: &ExporterMetrics) -> Response {
    let path = path.split('?').next().unwrap_or(path);
    let head = match method {
        "GET" => false,
        "HEAD" => true,
        _ => return Response::text(405, "Method Not Allowed", "Method Not Allowed"),
    };

    match path {
        "/" | "/metrics" => match metrics.encode() {
            Ok(body) => Response {
                status: 200,
                reason: "OK",
                content_type: CONTENT_TYPE,
                body,
                send_body: !head,
            },
            Err(e) => {
                error!(error = %e, "failed to encode metrics");
                Response::text(500, "Internal Server Error", "Internal Server Error")
            }
        },
        _ => Response::text(404, "Not Found", "Not Found"),
    }
}

/// Accept scrapes on `listener` until the task is dropped.
///
/// # Errors
/// Only if the listener's local address cannot be read; per-connection
/// failures are logged and do not stop the loop.
pub async fn serve(listener: TcpListener, metrics: ExporterMetrics) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "serving metrics");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "failed to accept metrics connection");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        let metrics = metrics.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &metrics).await {
                debug!(%peer, error = %e, "metrics connection error");
            }
        });
    }
}

async fn handle_connection(mut stream: TcpStream, metrics: &ExporterMetrics) -> std::io::Result<()> {
    let response = match tokio::time::timeout(READ_TIMEOUT, read_request_line(&mut stream)).await {
        Ok(Ok(Some((method, path)))) => {
            debug!(%method, %path, "metrics request");
            route(&method, &path, metrics)
        }
        Ok(Ok(None)) => Response::text(400, "Bad Request", "Bad Request"),
        Ok(Err(e)) => return Err(e),
        Err(_) => Response::text(408, "Request Timeout", "Request Timeout"),
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await
}

/// Read until the request head parses. `None` on malformed, oversized, or
/// truncated requests.
async fn read_request_line(stream: &mut TcpStream) -> std::io::Result<Option<(String, String)>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);
        match req.parse(&buf) {
            Ok(httparse::Status::Complete(_)) => {
                return Ok(req
                    .method
                    .zip(req.path)
                    .map(|(m, p)| (m.to_string(), p.to_string())));
            }
            Ok(httparse::Status::Partial) if buf.len() < MAX_REQUEST_BYTES => continue,
            _ => return Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
