//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (start-line)
//!     → matcher.rs (split start-line, evaluate method + path pattern)
//!     → router.rs (ordered table lookup, bind path parameter)
//!     → Return: Handler (NotFound when nothing matches)
//! ```
//!
//! # Design Decisions
//! - Routes are a static table, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;

pub use matcher::{Method, PathPattern, RouteMatcher, StartLine};
pub use router::{Handler, Route, RouteKind, Router};
