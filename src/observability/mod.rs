//! Observability subsystem.
//!
//! All subsystems emit structured `tracing` events; logging.rs installs the
//! subscriber that filters and formats them.
//!
//! # Design Decisions
//! - Connection ID flows through every per-connection event
//! - The parsing, routing and response core stays free of logging

pub mod logging;

pub use logging::init_logging;
