//! Request parsing and header access.
//!
//! # Responsibilities
//! - Split a raw byte buffer into start-line, header lines and body
//! - Look up individual headers by case-insensitive name
//!
//! # Design Decisions
//! - Parsing is all-or-nothing: a `Request` exists only when both separators are present
//! - The start-line is not interpreted here; the router owns that grammar
//! - Header lines are kept raw and in order; malformed lines are skipped at lookup time
//! - The body is opaque bytes with no `Content-Length` cross-check

use thiserror::Error;

/// Line terminator.
pub const CRLF: &[u8] = b"\r\n";

/// Separator between the header block and the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Why a buffer could not be turned into a request.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request: no line terminator after the start-line")]
    MissingStartLine,

    #[error("malformed request: header block is not terminated by a blank line")]
    MissingHeaderTerminator,
}

/// A parsed request, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    start_line: String,
    headers: Vec<String>,
    body: Vec<u8>,
}

impl Request {
    /// Parse a request from the bytes received on a connection.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let (start_line, rest) = split_once(raw, CRLF).ok_or(ParseError::MissingStartLine)?;

        // A blank line straight after the start-line means no headers at all.
        let (header_block, body) = match rest.strip_prefix(CRLF) {
            Some(body) => (&[][..], body),
            None => split_once(rest, HEADER_TERMINATOR).ok_or(ParseError::MissingHeaderTerminator)?,
        };

        let headers = if header_block.is_empty() {
            Vec::new()
        } else {
            String::from_utf8_lossy(header_block)
                .split("\r\n")
                .map(str::to_owned)
                .collect()
        };

        Ok(Self {
            start_line: String::from_utf8_lossy(start_line).into_owned(),
            headers,
            body: body.to_vec(),
        })
    }

    pub fn start_line(&self) -> &str {
        &self.start_line
    }

    /// Raw header lines, in the order they were received.
    pub fn header_lines(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Value of the first header called `name` (ASCII case-insensitive), trimmed.
    ///
    /// Lines without a `:` are ignored.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| trim_value(value))
        })
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Declared body length, if a parseable `Content-Length` header is present.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.parse().ok()
    }
}

fn trim_value(value: &str) -> &str {
    value.trim_matches(|c| c == ' ' || c == '\t')
}

/// Split `haystack` around the first occurrence of `needle`.
pub(crate) fn split_once<'a>(haystack: &'a [u8], needle: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    let at = find(haystack, needle)?;
    Some((&haystack[..at], &haystack[at + needle.len()..]))
}

/// Offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
