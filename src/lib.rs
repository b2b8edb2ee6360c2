//! Minimal HTTP/1.1 server library.
//!
//! Raw request bytes are parsed into a [`http::Request`], routed through a
//! fixed table to one handler, and answered with a byte-exact response,
//! optionally gzip-encoded.

// Core subsystems
pub mod config;
pub mod handlers;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
