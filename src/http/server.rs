//! HTTP server: the accept loop and the per-connection driver.
//!
//! # Responsibilities
//! - Accept connections until shutdown is signalled
//! - Read one request per connection, bounded by size and a deadline
//! - Hand the bytes to the [`Service`] on the blocking pool
//! - Write exactly one response and close the connection
//! - Wait for in-flight connections to drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::config::{LimitsConfig, ServerConfig};
use crate::handlers::{DirectoryStore, FileStore};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::service::Service;
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::routing::Router;

/// Error that stops the server as a whole.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// Error that ends a single connection before a response is written.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("no request received before the read deadline")]
    TimedOut,

    #[error("connection closed before sending any bytes")]
    Closed,
}

/// Per-connection settings, copied out of the config once.
#[derive(Debug, Clone)]
struct ConnectionSettings {
    limits: LimitsConfig,
    read_timeout: Duration,
}

/// HTTP server for the fixed route table.
pub struct HttpServer {
    config: Arc<ServerConfig>,
    service: Service,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a server whose file routes use `config.files.directory`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(DirectoryStore::new(config.files.directory.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn FileStore>) -> Self {
        Self {
            config: Arc::new(config),
            service: Service::new(Router::default(), store),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Run the accept loop until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let settings = ConnectionSettings {
            limits: self.config.limits.clone(),
            read_timeout: self.config.timeouts.read(),
        };

        tracing::info!(
            address = ?listener.local_addr().ok(),
            directory = %self.config.files.directory.display(),
            "HTTP server starting"
        );
        for route in self.service.routes() {
            tracing::debug!(route = %route.matcher, handler = ?route.kind, "Route registered");
        }

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        let guard = self.tracker.track();
                        let service = self.service.clone();
                        let settings = settings.clone();
                        tokio::spawn(serve_connection(stream, peer, service, settings, permit, guard));
                    }
                    Err(ListenerError::Accept(e)) => {
                        tracing::warn!(error = %e, "Accept failed");
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    Err(e) => return Err(e.into()),
                },
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        let grace = self.config.timeouts.shutdown_grace();
        if tokio::time::timeout(grace, self.tracker.wait_for_drain()).await.is_err() {
            tracing::warn!(
                active = self.tracker.active_count(),
                grace_secs = grace.as_secs(),
                "Connections still open after shutdown grace period"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve one request on `stream`.
///
/// The stream, the permit and the guard are dropped when this returns, whatever the outcome.
async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    service: Service,
    settings: ConnectionSettings,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
) {
    let connection_id = guard.id();

    let raw = match read_request(&mut stream, &settings.limits, settings.read_timeout).await {
        Ok(RawRequest { bytes, truncated }) => {
            if truncated {
                tracing::warn!(
                    connection_id = %connection_id,
                    peer_addr = %peer,
                    max_request_bytes = settings.limits.max_request_bytes,
                    "Request exceeded the size limit, handling the truncated prefix"
                );
            }
            bytes
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, peer_addr = %peer, error = %e, "Dropping connection");
            return;
        }
    };

    let response = match tokio::task::spawn_blocking(move || service.respond(&raw)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(connection_id = %connection_id, error = %e, "Request handler panicked");
            Response::not_found()
        }
    };

    let status = response.status();
    let bytes = response.into_bytes();
    if let Err(e) = write_response(&mut stream, &bytes).await {
        tracing::warn!(connection_id = %connection_id, peer_addr = %peer, error = %e, "Failed to write response");
        return;
    }

    tracing::info!(
        connection_id = %connection_id,
        peer_addr = %peer,
        status = status.as_u16(),
        bytes = bytes.len(),
        "Request served"
    );
}

/// Bytes buffered for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub bytes: Vec<u8>,
    /// Reading stopped at `max_request_bytes` before the request was complete.
    pub truncated: bool,
}

/// Read until a full request is buffered.
///
/// A request is complete once the header terminator is present and, if the
/// request declares a `Content-Length`, that many body bytes have arrived.
/// Reading also stops at EOF, at `max_request_bytes`, or at the deadline when
/// some bytes are already buffered.
pub async fn read_request<R>(
    reader: &mut R,
    limits: &LimitsConfig,
    timeout: Duration,
) -> Result<RawRequest, ReadError>
where
    R: AsyncRead + Unpin,
{
    let deadline = Instant::now() + timeout;
    let mut buf = Vec::with_capacity(limits.read_buffer_bytes);
    let mut chunk = vec![0u8; limits.read_buffer_bytes];
    let mut truncated = false;

    loop {
        let n = match tokio::time::timeout_at(deadline, reader.read(&mut chunk)).await {
            Ok(read) => read?,
            Err(_) if buf.is_empty() => return Err(ReadError::TimedOut),
            Err(_) => {
                tracing::debug!(buffered = buf.len(), "Read deadline passed, using partial request");
                break;
            }
        };
        if n == 0 {
            break;
        }

        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > limits.max_request_bytes {
            buf.truncate(limits.max_request_bytes);
            truncated = true;
            break;
        }
        if is_complete(&buf) {
            break;
        }
        if buf.len() == limits.max_request_bytes {
            truncated = true;
            break;
        }
    }

    if buf.is_empty() {
        return Err(ReadError::Closed);
    }
    Ok(RawRequest {
        bytes: buf,
        truncated,
    })
}

fn is_complete(buf: &[u8]) -> bool {
    match Request::parse(buf) {
        Ok(req) => req.body().len() >= req.content_length().unwrap_or(0),
        Err(_) => false,
    }
}

async fn write_response<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(read_buffer_bytes: usize, max_request_bytes: usize) -> LimitsConfig {
        LimitsConfig {
            read_buffer_bytes,
            max_request_bytes,
        }
    }

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn stops_at_header_terminator_without_body() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

        // The client stays open, so returning proves the terminator ended the read.
        let raw = read_request(&mut server, &limits(4, 1024), DEADLINE).await.unwrap();
        assert_eq!(raw.bytes, b"GET / HTTP/1.1\r\n\r\n");
        assert!(!raw.truncated);
        drop(client);
    }

    #[tokio::test]
    async fn waits_for_declared_body() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let reader = tokio::spawn(async move {
            read_request(&mut server, &limits(8, 1024), DEADLINE).await
        });

        client
            .write_all(b"POST /files/a HTTP/1.1\r\nContent-Length: 6\r\n\r\nabc")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.write_all(b"def").await.unwrap();

        let raw = reader.await.unwrap().unwrap();
        assert!(raw.bytes.ends_with(b"\r\n\r\nabcdef"));
        assert!(!raw.truncated);
    }

    #[tokio::test]
    async fn eof_ends_incomplete_request() {
        let mut input: &[u8] = b"garbage without terminator";
        let raw = read_request(&mut input, &limits(1024, 4096), DEADLINE).await.unwrap();
        assert_eq!(raw.bytes, b"garbage without terminator");
        assert!(!raw.truncated);
    }

    #[tokio::test]
    async fn size_limit_truncates() {
        let mut input: &[u8] = &[b'x'; 100];
        let raw = read_request(&mut input, &limits(16, 40), DEADLINE).await.unwrap();
        assert_eq!(raw.bytes.len(), 40);
        assert!(raw.truncated);
    }

    #[tokio::test]
    async fn oversized_body_is_flagged_as_truncated() {
        let request = format!(
            "POST /files/big HTTP/1.1\r\nContent-Length: 100\r\n\r\n{}",
            "x".repeat(100)
        );
        let mut input = request.as_bytes();
        let raw = read_request(&mut input, &limits(64, 64), DEADLINE).await.unwrap();
        assert_eq!(raw.bytes.len(), 64);
        assert!(raw.truncated);
    }

    #[tokio::test]
    async fn complete_request_at_the_limit_is_not_truncated() {
        let request = b"GET / HTTP/1.1\r\n\r\n";
        let mut input: &[u8] = request;
        let raw = read_request(&mut input, &limits(8, request.len()), DEADLINE)
            .await
            .unwrap();
        assert_eq!(raw.bytes, request);
        assert!(!raw.truncated);
    }

    #[tokio::test]
    async fn empty_connection_is_closed() {
        let mut input: &[u8] = b"";
        assert!(matches!(
            read_request(&mut input, &limits(16, 64), DEADLINE).await,
            Err(ReadError::Closed)
        ));
    }

    #[tokio::test]
    async fn deadline_with_nothing_buffered() {
        let (_client, mut server) = tokio::io::duplex(64);
        let result = read_request(&mut server, &limits(16, 64), Duration::from_millis(20)).await;
        assert!(matches!(result, Err(ReadError::TimedOut)));
    }

    #[tokio::test]
    async fn deadline_with_partial_request() {
        let (mut client, mut server) = tokio::io::duplex(64);
        client.write_all(b"GET / HTTP/1.1\r\nHost").await.unwrap();
        let raw = read_request(&mut server, &limits(16, 64), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(raw.bytes, b"GET / HTTP/1.1\r\nHost");
        assert!(!raw.truncated);
    }
}
