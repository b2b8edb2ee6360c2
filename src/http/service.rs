//! Request pipeline: bytes in, response out.
//!
//! Parsing, routing and handling are synchronous and free of socket concerns,
//! so the whole pipeline can be exercised without a listener.

use std::sync::Arc;

use crate::handlers::{self, FileStore};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::routing::{Route, Router};

/// The router and file store a connection needs to answer one request.
#[derive(Debug, Clone)]
pub struct Service {
    router: Arc<Router>,
    store: Arc<dyn FileStore>,
}

impl Service {
    pub fn new(router: Router, store: Arc<dyn FileStore>) -> Self {
        Self {
            router: Arc::new(router),
            store,
        }
    }

    /// The route table, in match order.
    pub fn routes(&self) -> &[Route] {
        self.router.routes()
    }

    /// Answer the request contained in `raw`.
    ///
    /// Malformed requests are answered with `404 Not Found`.
    pub fn respond(&self, raw: &[u8]) -> Response {
        let req = match Request::parse(raw) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(error = %e, bytes = raw.len(), "Rejecting request");
                return Response::not_found();
            }
        };

        let handler = self.router.route(&req);
        tracing::debug!(
            start_line = %req.start_line(),
            route = handler.name(),
            "Request routed"
        );

        handlers::handle(&handler, &req, self.store.as_ref())
    }

    pub fn respond_bytes(&self, raw: &[u8]) -> Vec<u8> {
        self.respond(raw).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::DirectoryStore;
    use crate::http::response::StatusCode;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn service() -> (tempfile::TempDir, Service) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryStore::new(dir.path()));
        (dir, Service::new(Router::default(), store))
    }

    #[test]
    fn echo_scenario() {
        let (_dir, service) = service();
        assert_eq!(
            service.respond_bytes(b"GET /echo/hello HTTP/1.1\r\nHost: x\r\n\r\n"),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn user_agent_scenario() {
        let (_dir, service) = service();
        let response =
            service.respond(b"GET /user-agent HTTP/1.1\r\nHost: x\r\nUser-Agent: curl/7\r\n\r\n");
        assert_eq!(response.body(), b"curl/7");
    }

    #[test]
    fn write_then_read_scenario() {
        let (_dir, service) = service();
        assert_eq!(
            service.respond_bytes(
                b"POST /files/note.txt HTTP/1.1\r\nHost: x\r\nContent-Length: 3\r\n\r\nhey"
            ),
            b"HTTP/1.1 201 Created\r\n\r\n"
        );

        let response = service.respond(b"GET /files/note.txt HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"hey");
    }

    #[test]
    fn routes_are_exposed_in_match_order() {
        let (_dir, service) = service();
        let first = service.routes().first().unwrap();
        assert_eq!(first.matcher.to_string(), "POST /files*");
        assert_eq!(service.routes().len(), 5);
    }

    #[test]
    fn unknown_route_scenario() {
        let (_dir, service) = service();
        assert_eq!(
            service.respond_bytes(b"GET /nope HTTP/1.1\r\n\r\n"),
            b"HTTP/1.1 404 Not Found\r\n\r\n"
        );
    }

    #[test]
    fn traversal_is_not_found() {
        let (_dir, service) = service();
        assert_eq!(
            service.respond_bytes(b"GET /files/../../etc/passwd HTTP/1.1\r\n\r\n"),
            b"HTTP/1.1 404 Not Found\r\n\r\n"
        );
    }

    #[test]
    fn malformed_is_not_found() {
        let (_dir, service) = service();
        for raw in [&b"no terminator"[..], b"GET / HTTP/1.1\r\nHost: x\r\n"] {
            assert_eq!(service.respond(raw).status(), StatusCode::NotFound);
        }
    }

    #[test]
    fn gzip_echo_decodes_to_original() {
        let (_dir, service) = service();
        let bytes = service.respond_bytes(
            b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-encoding, gzip\r\n\r\n",
        );

        let split = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = std::str::from_utf8(&bytes[..split]).unwrap();
        let body = &bytes[split + 4..];

        assert!(head.contains("Content-Encoding: gzip"));
        assert!(head.contains(&format!("Content-Length: {}", body.len())));

        let mut decoded = String::new();
        GzDecoder::new(body).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "abc");
    }
}
