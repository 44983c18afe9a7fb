//! Wire-level debugging via LOUD_WIRE environment variable.
//!
//! When `LOUD_WIRE` is set to any value, prints the request line, headers and
//! response of every service call to stderr with colors.
//!
//! # Usage
//!
//! ```bash
//! LOUD_WIRE=1 cargo test --test match_files_tests -- --nocapture
//! ```
//!
//! # Output Format
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Timestamps and request IDs for correlation
//!
//! Multipart bodies are summarised by size; image bytes are never printed.

use super::response::truncate_for_context;
use colored::Colorize;
use reqwest::{Request, StatusCode};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Request ID counter for correlating requests with responses
static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Cached check for whether LOUD_WIRE is enabled
static ENABLED: OnceLock<bool> = OnceLock::new();

/// Maximum characters of a non-JSON body to print.
const TEXT_BODY_PREVIEW_LENGTH: usize = 1000;

/// Check if LOUD_WIRE debugging is enabled.
///
/// The result is cached after the first check, so `LOUD_WIRE` must be set
/// before the first call is made.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var("LOUD_WIRE").is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Log prefix with timestamp and request ID.
fn prefix(request_id: usize) -> String {
    let ts = timestamp().dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{}]", request_id).cyan()
    )
}

/// Renders the request line and headers of `request` in HTTP/1.1 form.
///
/// The body is not included. Useful when inspecting what an upload would
/// send without a running service.
#[must_use]
pub fn dump_request(request: &Request) -> String {
    let url = request.url();
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut dump = format!("{} {} HTTP/1.1\r\n", request.method(), target);
    if let Some(host) = url.host_str() {
        match url.port() {
            Some(port) => dump.push_str(&format!("Host: {host}:{port}\r\n")),
            None => dump.push_str(&format!("Host: {host}\r\n")),
        }
    }
    for (name, value) in request.headers() {
        dump.push_str(&format!(
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    dump.push_str("\r\n");
    dump
}

/// Summarises a request body without printing binary content.
fn describe_body(request: &Request) -> Option<String> {
    let body = request.body()?;
    let is_multipart = request
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/"));

    Some(match body.as_bytes() {
        Some(bytes) if is_multipart => format!("<{} bytes multipart body>", bytes.len()),
        Some(bytes) => truncate_for_context(&String::from_utf8_lossy(bytes), TEXT_BODY_PREVIEW_LENGTH),
        None => "<streamed body>".to_string(),
    })
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, request: &Request) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();

    eprintln!("{prefix} {direction} {} {}", request.method(), request.url());
    for (name, value) in request.headers() {
        eprintln!(
            "{prefix} {}: {}",
            name.as_str().green(),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    if let Some(body) = describe_body(request) {
        eprintln!("{prefix} {}: {body}", "Body".green());
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: StatusCode) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();
    let status_text = if status == StatusCode::OK {
        status.to_string().green()
    } else {
        status.to_string().red()
    };

    eprintln!("{prefix} {direction} {status_text}");
}

/// Log an incoming HTTP response body.
pub fn log_response_body(request_id: usize, body: &[u8]) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);

    if let Ok(parsed) = serde_json::from_slice::<serde_json::Value>(body) {
        eprintln!("{prefix} {}:", "Response".red());
        if let Ok(colored) = colored_json::to_colored_json_auto(&parsed) {
            for line in colored.lines() {
                eprintln!("{prefix} {line}");
            }
        } else if let Ok(pretty) = serde_json::to_string_pretty(&parsed) {
            for line in pretty.lines() {
                eprintln!("{prefix} {line}");
            }
        }
    } else {
        let text = String::from_utf8_lossy(body);
        eprintln!(
            "{prefix} {}: {}",
            "Response".red(),
            truncate_for_context(&text, TEXT_BODY_PREVIEW_LENGTH)
        );
    }
}
