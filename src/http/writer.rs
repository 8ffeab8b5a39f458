use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::encoding::negotiate;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes `resp` to wire bytes, compressing the body when the client's
/// `Accept-Encoding` allows it.
///
/// Headers go out in insertion order, followed by `Content-Encoding` (only
/// when a coding was applied) and then `Content-Length`, which always
/// describes the bytes actually sent. Empty bodies are never compressed.
pub fn serialize_response(resp: &Response, accept_encoding: Option<&str>) -> Vec<u8> {
    let mut encoding = if resp.body.is_empty() {
        None
    } else {
        negotiate(accept_encoding)
    };

    let compressed = match encoding {
        Some(enc) => match enc.compress(&resp.body) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    encoding = enc.as_str(),
                    "Compression failed, sending identity body"
                );
                encoding = None;
                None
            }
        },
        None => None,
    };
    let body = compressed.as_deref().unwrap_or(&resp.body);

    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers.iter() {
        if k.eq_ignore_ascii_case("content-length") || k.eq_ignore_ascii_case("content-encoding") {
            continue;
        }
        push_header(&mut buf, k, v);
    }

    if let Some(enc) = encoding {
        push_header(&mut buf, "Content-Encoding", enc.as_str());
    }
    push_header(&mut buf, "Content-Length", &body.len().to_string());

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(body);

    buf
}

fn push_header(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Holds a serialized response until it has been fully written.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, accept_encoding: Option<&str>) -> Self {
        Self {
            buffer: serialize_response(response, accept_encoding),
            written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
