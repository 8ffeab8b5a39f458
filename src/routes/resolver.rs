//! Route key extraction.
//!
//! A path maps to a route key (its first segment, lower-cased) and an opaque
//! parameter (everything after that segment):
//!
//! ```text
//! /                 -> ("", "")
//! /echo/hi          -> ("echo", "hi")
//! /Files/a/b.txt/   -> ("files", "a/b.txt")
//! ```

/// Splits `path` into `(route, route_param)`.
///
/// Leading and trailing slashes are ignored. The route is lower-cased and
/// never contains a slash; the parameter keeps its case and never starts
/// with a slash.
pub fn split_route(path: &str) -> (String, String) {
    let trimmed = path.trim_matches('/');

    let (route, param) = trimmed.split_once('/').unwrap_or((trimmed, ""));

    (
        route.to_lowercase(),
        param.trim_start_matches('/').to_string(),
    )
}
