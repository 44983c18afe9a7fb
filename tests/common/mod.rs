//! Common test utilities shared across all integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use async_trait::async_trait;
use biometric_match_client::{BoxError, HttpTransport, MatchClient};
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Small 1x1 PNG used as image fixture content.
#[allow(dead_code)]
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc,
    0xcf, 0xc0, 0xf0, 0x1f, 0x00, 0x05, 0x05, 0x02, 0x00, 0x5f, 0xc8, 0xf1, 0xd2, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// What the mock transport saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
enum Reply {
    Status(u16, Vec<u8>),
    Fail(String),
}

/// Transport double that records requests and answers every call with the
/// same canned reply.
///
/// Clones share the recorded requests, so a test can keep one handle while
/// the client owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Reply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockTransport {
    /// Answers with `status` and `body`.
    pub fn responding(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            reply: Reply::Status(status, body.into()),
            requests: Arc::default(),
        }
    }

    /// Fails every call as a network error would.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Fail(message.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "Expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, BoxError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(<[u8]>::to_vec),
        });

        match &self.reply {
            Reply::Status(status, body) => Ok(Response::from(
                http::Response::builder()
                    .status(*status)
                    .body(body.clone())
                    .unwrap(),
            )),
            Reply::Fail(message) => Err(message.clone().into()),
        }
    }
}

/// Builds a client on the default base URL that sends through `transport`.
pub fn client_with(transport: &MockTransport) -> MatchClient {
    MatchClient::builder()
        .transport(transport.clone())
        .build()
        .expect("Failed to build client")
}

/// Writes `contents` to `dir/name` and returns the path.
#[allow(dead_code)]
pub fn write_image(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write image fixture");
    path
}

/// One decoded multipart section.
#[allow(dead_code)]
#[derive(Debug)]
pub struct ParsedPart {
    pub headers: String,
    pub content: Vec<u8>,
}

/// Extracts the boundary from a `multipart/form-data; boundary=...` value.
#[allow(dead_code)]
pub fn boundary_of(content_type: &str) -> &str {
    content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("Content-Type should be multipart/form-data with a boundary")
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Splits a multipart body into its parts, asserting the closing delimiter.
#[allow(dead_code)]
pub fn parse_multipart(body: &[u8], boundary: &str) -> Vec<ParsedPart> {
    let mut data = b"\r\n".to_vec();
    data.extend_from_slice(body);
    let delimiter = format!("\r\n--{boundary}").into_bytes();

    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(pos) = find(&data, &delimiter, from) {
        positions.push(pos);
        from = pos + delimiter.len();
    }
    assert!(!positions.is_empty(), "Body has no boundary delimiter");
    assert_eq!(positions[0], 0, "Body should start with a delimiter");

    let last = *positions.last().unwrap();
    assert_eq!(
        &data[last + delimiter.len()..],
        b"--\r\n",
        "Body should end with the closing delimiter"
    );

    positions
        .windows(2)
        .map(|pair| {
            let section = &data[pair[0] + delimiter.len()..pair[1]];
            let section = section
                .strip_prefix(b"\r\n")
                .expect("Delimiter should be followed by CRLF");
            let header_end = find(section, b"\r\n\r\n", 0).expect("Part headers should end");
            ParsedPart {
                headers: String::from_utf8(section[..header_end].to_vec()).unwrap(),
                content: section[header_end + 4..].to_vec(),
            }
        })
        .collect()
}
