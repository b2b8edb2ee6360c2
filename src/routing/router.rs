//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the ordered route table
//! - Map every request to exactly one [`Handler`], falling back to `NotFound`
//! - Extract path parameters for the routes that take one
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in table order; first match wins
//! - Routing is total: no request fails to route

use crate::http::request::Request;
use crate::routing::matcher::{Method, RouteMatcher, StartLine};

/// Which handler a route selects, before its parameter is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    FileWrite,
    FileRead,
    UserAgent,
    Echo,
    Root,
}

/// A handler with its path parameter bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    FileWrite { name: String },
    FileRead { name: String },
    UserAgent,
    Echo { text: String },
    Root,
    NotFound,
}

impl Handler {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Handler::FileWrite { .. } => "file_write",
            Handler::FileRead { .. } => "file_read",
            Handler::UserAgent => "user_agent",
            Handler::Echo { .. } => "echo",
            Handler::Root => "root",
            Handler::NotFound => "not_found",
        }
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub matcher: RouteMatcher,
    pub kind: RouteKind,
}

impl Route {
    pub fn new(matcher: RouteMatcher, kind: RouteKind) -> Self {
        Self { matcher, kind }
    }

    fn bind(&self, param: &str) -> Handler {
        match self.kind {
            RouteKind::FileWrite => Handler::FileWrite {
                name: param.trim().to_string(),
            },
            RouteKind::FileRead => Handler::FileRead {
                name: param.trim().to_string(),
            },
            RouteKind::UserAgent => Handler::UserAgent,
            RouteKind::Echo => Handler::Echo {
                text: param.to_string(),
            },
            RouteKind::Root => Handler::Root,
        }
    }
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Select the handler for `req`.
    pub fn route(&self, req: &Request) -> Handler {
        self.route_line(req.start_line())
    }

    pub fn route_line(&self, start_line: &str) -> Handler {
        let line = StartLine::split(start_line);
        self.routes
            .iter()
            .find_map(|route| route.matcher.matches(&line).map(|param| route.bind(param)))
            .unwrap_or(Handler::NotFound)
    }
}

impl Default for Router {
    /// The server's fixed route table.
    fn default() -> Self {
        Self::new(vec![
            Route::new(RouteMatcher::prefix(Method::Post, "/files"), RouteKind::FileWrite),
            Route::new(RouteMatcher::prefix(Method::Get, "/files"), RouteKind::FileRead),
            Route::new(RouteMatcher::prefix(Method::Get, "/user-agent"), RouteKind::UserAgent),
            Route::new(RouteMatcher::prefix(Method::Get, "/echo/"), RouteKind::Echo),
            Route::new(RouteMatcher::exact(Method::Get, "/"), RouteKind::Root),
        ])
    }
}
