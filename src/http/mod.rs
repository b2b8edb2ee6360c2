//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (read loop, deadline, one request per connection)
//!     → service.rs (parse → route → handle)
//!         → request.rs (start-line, header lines, body; header lookup)
//!         → [routing layer selects a handler]
//!         → encoding.rs (Accept-Encoding negotiation, gzip)
//!         → response.rs (status line, entity headers, body)
//!     → Send to client, close
//! ```

pub mod encoding;
pub mod request;
pub mod response;
pub mod server;
pub mod service;

pub use encoding::{ContentCoding, Negotiation};
pub use request::{ParseError, Request};
pub use response::{build, Response, StatusCode};
pub use server::{HttpServer, ServerError};
pub use service::Service;
