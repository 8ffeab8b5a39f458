//! Response body compression.
//!
//! Negotiation takes the client's `Accept-Encoding` list in the order it was
//! sent and picks the first coding the server supports. Quality values are
//! not interpreted: `gzip;q=0.5` is a different token than `gzip`.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Content codings the server can apply to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

/// Every coding the server supports, in server preference order.
pub const SUPPORTED_ENCODINGS: &[ContentEncoding] = &[ContentEncoding::Gzip];

impl ContentEncoding {
    /// Token used in `Accept-Encoding` and `Content-Encoding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        SUPPORTED_ENCODINGS
            .iter()
            .copied()
            .find(|enc| enc.as_str().eq_ignore_ascii_case(token))
    }

    /// Encodes `body` with this coding.
    pub fn compress(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(body)?;
                encoder.finish()
            }
        }
    }
}

/// Picks the first supported coding from a comma-separated `Accept-Encoding`
/// value. A missing header or a list with no supported token yields `None`.
pub fn negotiate(accept_encoding: Option<&str>) -> Option<ContentEncoding> {
    accept_encoding?
        .split(',')
        .map(str::trim)
        .find_map(ContentEncoding::from_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_supported_token_wins() {
        assert_eq!(
            negotiate(Some("br, deflate , gzip")),
            Some(ContentEncoding::Gzip)
        );
    }

    #[test]
    fn no_match_means_identity() {
        assert_eq!(negotiate(None), None);
        assert_eq!(negotiate(Some("")), None);
        assert_eq!(negotiate(Some("br, deflate")), None);
        assert_eq!(negotiate(Some("gzip;q=1.0")), None);
    }
}
