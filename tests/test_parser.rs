use courier::http::parser::{Frame, ParseError, frame_length, parse_http_request};
use courier::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    assert_eq!(parsed.route, "");
    assert_eq!(parsed.route_param, "");
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /files/a.txt HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/files/a.txt");
    assert_eq!(parsed.route, "files");
    assert_eq!(parsed.route_param, "a.txt");
    assert_eq!(parsed.body, b"hello".to_vec());
}

#[test]
fn test_parse_body_without_any_headers() {
    let req = b"POST /files/x HTTP/1.1\r\n\r\nraw";
    let parsed = parse_http_request(req).unwrap();

    assert!(parsed.headers.is_empty());
    assert_eq!(parsed.body, b"raw".to_vec());
}

#[test]
fn test_parse_body_length_is_what_was_read() {
    // Content-Length is not cross-checked by the parser.
    let req = b"POST /files/x HTTP/1.1\r\nContent-Length: 2\r\n\r\nabcdef";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"abcdef".to_vec());
}

#[test]
fn test_parse_headers_are_lowercased_and_trimmed() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent:   test-client  \r\nACCEPT: */*\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    assert_eq!(parsed.headers.get("user-agent").unwrap(), "test-client");
    assert_eq!(parsed.headers.get("accept").unwrap(), "*/*");
    assert!(!parsed.headers.contains_key("Host"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Tag: one\r\nx-tag: two\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("x-tag").unwrap(), "two");
    assert_eq!(parsed.headers.len(), 1);
}

#[test]
fn test_parse_header_value_keeps_later_colons() {
    let req = b"GET / HTTP/1.1\r\nHost: localhost:4221\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.get("host").unwrap(), "localhost:4221");
}

#[test]
fn test_parse_header_without_colon_is_skipped() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
}

#[test]
fn test_parse_header_with_empty_name() {
    let req = b"GET / HTTP/1.1\r\n: orphan\r\n\r\n";
    let result = parse_http_request(req);

    assert_eq!(result.unwrap_err(), ParseError::InvalidHeader);
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/search?q=rust");
    assert_eq!(parsed.route, "search?q=rust");
}

#[test]
fn test_parse_path_is_not_percent_decoded() {
    let req = b"GET /echo/a%20b HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.route_param, "a%20b");
}

#[test]
fn test_parse_route_is_lowercased() {
    let req = b"GET /EcHo/MiXeD HTTP/1.1\r\n\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.route, "echo");
    assert_eq!(parsed.route_param, "MiXeD");
}

#[test]
fn test_parse_without_header_terminator() {
    let req = b"GET /echo/hi HTTP/1.1\r\nHost: example.com\r\n";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.route_param, "hi");
    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
}

#[test]
fn test_parse_missing_version_is_accepted() {
    let parsed = parse_http_request(b"GET /").unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
}

#[test]
fn test_parse_empty_request() {
    assert_eq!(parse_http_request(b"").unwrap_err(), ParseError::Empty);
}

#[test]
fn test_parse_invalid_utf8_head() {
    let req = b"GET /\xff\xfe HTTP/1.1\r\n\r\n";
    assert_eq!(parse_http_request(req).unwrap_err(), ParseError::InvalidEncoding);
}

#[test]
fn test_parse_invalid_request_line() {
    assert_eq!(
        parse_http_request(b"GARBAGE\r\n\r\n").unwrap_err(),
        ParseError::InvalidRequestLine
    );
}

#[test]
fn test_parse_invalid_http_method() {
    let req = b"TRACE / HTTP/1.1\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidMethod(m)) if m == "TRACE"));
}

#[test]
fn test_parse_method_is_case_sensitive() {
    let result = parse_http_request(b"get / HTTP/1.1\r\n\r\n");

    assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let parsed = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"POST /files/blob HTTP/1.1\r\nContent-Length: 6\r\n\r\n\x00\x01\xff\xfe\x02\x03";
    let parsed = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0, 1, 0xff, 0xfe, 2, 3]);
}

#[test]
fn test_frame_without_content_length_takes_everything() {
    let req = b"GET / HTTP/1.1\r\n\r\nextra";
    assert_eq!(frame_length(req, 8192, 1024), Frame::Complete(req.len()));
}

#[test]
fn test_frame_without_terminator_is_incomplete() {
    let req = b"GET / HTTP/1.1\r\nHost: x";
    assert_eq!(frame_length(req, 8192, 1024), Frame::Incomplete);
}

#[test]
fn test_frame_rejects_oversized_head() {
    let mut req = b"GET / HTTP/1.1\r\nCookie: ".to_vec();
    req.extend(std::iter::repeat_n(b'a', 100));
    assert_eq!(frame_length(&req, 64, 1024), Frame::HeadTooLarge);

    req.extend_from_slice(b"\r\n\r\n");
    assert_eq!(frame_length(&req, 64, 1024), Frame::HeadTooLarge);
    assert_eq!(frame_length(&req, 8192, 1024), Frame::Complete(req.len()));
}

#[test]
fn test_frame_rejects_oversized_declared_body() {
    let req = b"POST /files/a HTTP/1.1\r\ncontent-length: 4096\r\n\r\n";
    assert_eq!(frame_length(req, 8192, 1024), Frame::TooLarge(4096));
}

#[test]
fn test_frame_ignores_unparseable_content_length() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: lots\r\n\r\nab";
    assert_eq!(frame_length(req, 8192, 1024), Frame::Complete(req.len()));
}
