use std::collections::HashMap;

use thiserror::Error;

use crate::http::request::{Method, Request};
use crate::routes::resolver::split_route;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Why a buffer could not be turned into a [`Request`].
///
/// Every variant is answered with 400 Bad Request; the tag only matters for
/// logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("received empty request")]
    Empty,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("unsupported HTTP method: {0}")]
    InvalidMethod(String),
    #[error("malformed header line")]
    InvalidHeader,
}

/// How much of a read buffer makes up the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// The first `n` bytes hold one request.
    Complete(usize),
    /// The head, or the body it declares, has not fully arrived yet.
    Incomplete,
    /// No blank line within the accepted head size.
    HeadTooLarge,
    /// The declared `Content-Length` exceeds the accepted maximum.
    TooLarge(usize),
}

/// Parses one request out of `buf`.
///
/// The head (request line and headers) must be UTF-8; the body is kept as raw
/// bytes. Everything after the blank line is the body: no `Content-Length`
/// cross-check happens here, framing is the caller's job (see
/// [`frame_length`]). Without a blank line, which only happens when the peer
/// stopped sending mid-head, the whole buffer is treated as the head and the
/// body is empty.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let (head_bytes, body_bytes) = match find_headers_end(buf) {
        Some(end) => (&buf[..end], &buf[end + HEADER_TERMINATOR.len()..]),
        None => (buf, &[][..]),
    };

    let head = std::str::from_utf8(head_bytes).map_err(|_| ParseError::InvalidEncoding)?;
    let (request_line, header_block) = head.split_once("\r\n").unwrap_or((head, ""));

    // Request line
    let parts: Vec<&str> = request_line.split(' ').collect();
    if parts.len() < 2 {
        return Err(ParseError::InvalidRequestLine);
    }

    let method =
        Method::from_str(parts[0]).ok_or_else(|| ParseError::InvalidMethod(parts[0].to_string()))?;
    let path = parts[1];

    let headers = parse_headers(header_block)?;
    let (route, route_param) = split_route(path);

    Ok(Request {
        method,
        path: path.to_string(),
        headers,
        body: body_bytes.to_vec(),
        route,
        route_param,
    })
}

// Lines without a colon are skipped; later duplicates overwrite earlier ones.
fn parse_headers(block: &str) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();

    for line in block.split("\r\n") {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(ParseError::InvalidHeader);
        }

        headers.insert(key.to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(headers)
}

/// Works out how many bytes of `buf` belong to the next request.
///
/// Until the blank line arrives the request is incomplete, unless more than
/// `max_head` bytes are already buffered. A complete head with a valid
/// `Content-Length` frames exactly that many body bytes; a head without one
/// takes everything that was read.
pub fn frame_length(buf: &[u8], max_head: usize, max_body: usize) -> Frame {
    let Some(end) = find_headers_end(buf) else {
        return if buf.len() > max_head {
            Frame::HeadTooLarge
        } else {
            Frame::Incomplete
        };
    };
    if end > max_head {
        return Frame::HeadTooLarge;
    }
    let body_start = end + HEADER_TERMINATOR.len();

    let declared = std::str::from_utf8(&buf[..end])
        .ok()
        .and_then(declared_content_length);

    match declared {
        Some(len) if len > max_body => Frame::TooLarge(len),
        Some(len) if buf.len() >= body_start + len => Frame::Complete(body_start + len),
        Some(_) => Frame::Incomplete,
        None => Frame::Complete(buf.len()),
    }
}

fn declared_content_length(head: &str) -> Option<usize> {
    head.split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .last()
        .and_then(|(_, value)| value.trim().parse().ok())
}

pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|w| w == HEADER_TERMINATOR)
}
