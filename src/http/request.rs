//! Outbound request assembly.

use crate::errors::MatchClientError;
use crate::multipart::EncodedForm;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use reqwest::{Body, Method, Request, Url};

/// Builds a body-less GET with `Cache-Control: no-cache`.
#[must_use]
pub fn get_request(url: Url) -> Request {
    let mut request = Request::new(Method::GET, url);
    request
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    request
}

/// Builds a POST carrying a closed multipart form.
///
/// # Errors
///
/// Returns [`MatchClientError::InvalidHeader`] if the form's content type is
/// not a valid header value.
pub fn upload_request(url: Url, form: EncodedForm) -> Result<Request, MatchClientError> {
    let content_type = HeaderValue::from_str(form.content_type())?;

    let mut request = Request::new(Method::POST, url);
    request.headers_mut().insert(CONTENT_TYPE, content_type);
    *request.body_mut() = Some(Body::from(form.into_body()));
    Ok(request)
}
