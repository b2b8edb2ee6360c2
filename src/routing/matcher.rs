//! Route matching logic.
//!
//! # Responsibilities
//! - Split a start-line into method, target and protocol token
//! - Match method exactly and path by prefix or exact target
//! - Extract the path parameter that follows a prefix
//!
//! # Design Decisions
//! - Method is part of every match, so `POST /files` and `GET /files` never collide
//! - The protocol token is whatever follows the last space, not a pinned `HTTP/1.1`
//! - No regex: prefix and equality checks only

use std::fmt;

/// Protocol token this server speaks.
pub const HTTP_1_1: &str = "HTTP/1.1";

/// Request methods the router distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A start-line split on its outer spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartLine<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub version: &'a str,
}

impl<'a> StartLine<'a> {
    /// Split without validating.
    ///
    /// The method runs up to the first space and the version is the token after
    /// the last one; the target is everything in between, so it may contain spaces.
    /// With a single space there is no version token.
    pub fn split(line: &'a str) -> Self {
        let Some((method, rest)) = line.split_once(' ') else {
            return Self {
                method: line,
                target: "",
                version: "",
            };
        };

        match rest.rsplit_once(' ') {
            Some((target, version)) => Self {
                method,
                target,
                version,
            },
            None => Self {
                method,
                target: rest,
                version: "",
            },
        }
    }
}

/// How a route's path is compared against the request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Target starts with the prefix; the remainder becomes the path parameter.
    Prefix(&'static str),
    /// Target equals the path and the protocol token is `HTTP/1.1`.
    Exact(&'static str),
}

/// A method plus path condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatcher {
    method: Method,
    path: PathPattern,
}

impl RouteMatcher {
    pub fn new(method: Method, path: PathPattern) -> Self {
        Self { method, path }
    }

    pub fn prefix(method: Method, prefix: &'static str) -> Self {
        Self::new(method, PathPattern::Prefix(prefix))
    }

    pub fn exact(method: Method, path: &'static str) -> Self {
        Self::new(method, PathPattern::Exact(path))
    }

    /// Returns the path parameter on a match; empty for exact matches.
    pub fn matches<'a>(&self, line: &StartLine<'a>) -> Option<&'a str> {
        if line.method != self.method.as_str() {
            return None;
        }
        match self.path {
            PathPattern::Prefix(prefix) => line.target.strip_prefix(prefix),
            PathPattern::Exact(path) => {
                (line.target == path && line.version == HTTP_1_1).then_some("")
            }
        }
    }
}

impl fmt::Display for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            PathPattern::Prefix(prefix) => write!(f, "{} {}*", self.method, prefix),
            PathPattern::Exact(path) => write!(f, "{} {}", self.method, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_three_tokens() {
        let line = StartLine::split("GET /echo/hi HTTP/1.1");
        assert_eq!(line.method, "GET");
        assert_eq!(line.target, "/echo/hi");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn target_may_contain_spaces() {
        let line = StartLine::split("GET /echo/a b HTTP/1.0");
        assert_eq!(line.target, "/echo/a b");
        assert_eq!(line.version, "HTTP/1.0");
    }

    #[test]
    fn missing_tokens_are_empty() {
        assert_eq!(
            StartLine::split("GARBAGE"),
            StartLine {
                method: "GARBAGE",
                target: "",
                version: ""
            }
        );
        let line = StartLine::split("GET /echo/x");
        assert_eq!(line.target, "/echo/x");
        assert_eq!(line.version, "");
    }

    #[test]
    fn method_is_part_of_the_match() {
        let matcher = RouteMatcher::prefix(Method::Get, "/files");
        let post = StartLine::split("POST /files/a.txt HTTP/1.1");
        let get = StartLine::split("GET /files/a.txt HTTP/1.1");

        assert_eq!(matcher.matches(&post), None);
        assert_eq!(matcher.matches(&get), Some("/a.txt"));
    }

    #[test]
    fn display_names_method_and_pattern() {
        assert_eq!(RouteMatcher::prefix(Method::Post, "/files").to_string(), "POST /files*");
        assert_eq!(RouteMatcher::exact(Method::Get, "/").to_string(), "GET /");
    }

    #[test]
    fn exact_requires_target_and_version() {
        let matcher = RouteMatcher::exact(Method::Get, "/");
        assert_eq!(matcher.matches(&StartLine::split("GET / HTTP/1.1")), Some(""));
        assert_eq!(matcher.matches(&StartLine::split("GET / HTTP/1.0")), None);
        assert_eq!(matcher.matches(&StartLine::split("GET /x HTTP/1.1")), None);
    }
}
