//! Response building and serialization.
//!
//! # Responsibilities
//! - Model the three statuses this server produces
//! - Apply a negotiated content coding before the body is measured
//! - Serialize status line, headers and body into wire bytes
//!
//! # Design Decisions
//! - Empty bodies serialize to the bare status line plus blank line
//! - Header order is fixed: Content-Type, Content-Length, Content-Encoding
//! - Content-Length is always taken from the bytes that are actually sent

use std::fmt;
use std::io;

use crate::http::encoding::ContentCoding;

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Created,
    NotFound,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NotFound => "Not Found",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

/// A response ready to be serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    content_type: &'static str,
    encoding: Option<ContentCoding>,
    body: Vec<u8>,
}

impl Response {
    /// A response with no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            encoding: None,
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::Ok)
    }

    pub fn created() -> Self {
        Self::new(StatusCode::Created)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>, content_type: &'static str) -> Self {
        self.body = body.into();
        self.content_type = content_type;
        self
    }

    /// Encode the current body with `coding`.
    ///
    /// Must run after [`with_body`](Self::with_body). Empty bodies are left as they are.
    pub fn encoded(mut self, coding: Option<ContentCoding>) -> io::Result<Self> {
        if let Some(coding) = coding {
            if !self.body.is_empty() {
                self.body = coding.encode(&self.body)?;
                self.encoding = Some(coding);
            }
        }
        Ok(self)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);

        if !self.body.is_empty() {
            head.push_str(&format!("Content-Type: {}\r\n", self.content_type));
            head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
            if let Some(coding) = self.encoding {
                head.push_str(&format!("Content-Encoding: {}\r\n", coding));
            }
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Serialize a response in one call.
pub fn build(
    status: StatusCode,
    body: &[u8],
    content_type: &'static str,
    encoding: Option<ContentCoding>,
) -> io::Result<Vec<u8>> {
    Ok(Response::new(status)
        .with_body(body, content_type)
        .encoded(encoding)?
        .into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn empty_body_has_no_entity_headers() {
        let bytes = build(StatusCode::Ok, b"", TEXT_PLAIN, None).unwrap();
        assert_eq!(bytes, b"HTTP/1.1 200 OK\r\n\r\n");

        let bytes = build(StatusCode::Ok, b"", TEXT_PLAIN, Some(ContentCoding::Gzip)).unwrap();
        assert_eq!(bytes, b"HTTP/1.1 200 OK\r\n\r\n");
    }

    #[test]
    fn status_lines() {
        assert_eq!(Response::created().into_bytes(), b"HTTP/1.1 201 Created\r\n\r\n");
        assert_eq!(Response::not_found().into_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn body_headers_in_fixed_order() {
        let bytes = build(StatusCode::Ok, b"hello", TEXT_PLAIN, None).unwrap();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn gzip_length_is_compressed_length() {
        let response = Response::ok()
            .with_body("abc", TEXT_PLAIN)
            .encoded(Some(ContentCoding::Gzip))
            .unwrap();
        let compressed = response.body().to_vec();
        let bytes = response.into_bytes();

        let expected_head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nContent-Encoding: gzip\r\n\r\n",
            compressed.len()
        );
        assert!(bytes.starts_with(expected_head.as_bytes()));
        assert_eq!(&bytes[expected_head.len()..], &compressed[..]);

        let mut decoded = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"abc");
    }
}
