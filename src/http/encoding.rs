//! Content-encoding negotiation and compression.
//!
//! Only `gzip` is supported. The negotiation result distinguishes a missing
//! `Accept-Encoding` header from one that lists nothing usable, but callers
//! that only need the boolean use [`Negotiation::selected`].

use std::fmt;
use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::http::request::Request;

/// A content coding this server can apply to response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Gzip,
}

impl ContentCoding {
    /// Token used in `Accept-Encoding` and `Content-Encoding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCoding::Gzip => "gzip",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "gzip" => Some(ContentCoding::Gzip),
            _ => None,
        }
    }

    /// Encode `body` with this coding.
    pub fn encode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            ContentCoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of reading a request's `Accept-Encoding` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// The request carries no `Accept-Encoding` header.
    HeaderMissing,
    /// The header is present but lists no supported coding.
    Unsupported,
    Selected(ContentCoding),
}

impl Negotiation {
    /// Inspect the first `Accept-Encoding` header of `req`.
    pub fn from_request(req: &Request) -> Self {
        match req.header("accept-encoding") {
            None => Negotiation::HeaderMissing,
            Some(value) => value
                .split(',')
                .find_map(ContentCoding::from_token)
                .map_or(Negotiation::Unsupported, Negotiation::Selected),
        }
    }

    pub fn selected(&self) -> Option<ContentCoding> {
        match self {
            Negotiation::Selected(coding) => Some(*coding),
            _ => None,
        }
    }
}
