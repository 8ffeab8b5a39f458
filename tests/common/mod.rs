//! Client-side helpers shared by the connection and server tests.

#![allow(dead_code)]

use tokio::io::{AsyncRead, AsyncReadExt};

pub struct RawResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn status(&self) -> u16 {
        self.status_line
            .split(' ')
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap_or(0)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Reads exactly one response framed by its Content-Length.
///
/// Never consumes bytes past that response, so pipelined responses can be
/// read one after another. Returns `None` if the server closed the stream
/// before sending anything.
pub async fn read_response<S>(stream: &mut S) -> Option<RawResponse>
where
    S: AsyncRead + Unpin,
{
    let mut head = Vec::new();
    let mut byte = [0u8; 1];

    while !head.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut byte).await.expect("read response");
        if n == 0 {
            assert!(head.is_empty(), "connection closed mid-response");
            return None;
        }
        head.push(byte[0]);
    }

    let head = String::from_utf8(head[..head.len() - 4].to_vec()).expect("utf-8 head");
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.parse().expect("numeric content-length"))
        .unwrap_or(0);

    let mut body = vec![0u8; length];
    stream.read_exact(&mut body).await.expect("read body");

    Some(RawResponse {
        status_line,
        headers,
        body,
    })
}

/// True once the peer has closed its write side.
pub async fn is_closed<S>(stream: &mut S) -> bool
where
    S: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    matches!(stream.read(&mut byte).await, Ok(0) | Err(_))
}
