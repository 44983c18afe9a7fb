use crate::errors::MatchClientError;
use reqwest::Url;

// --- URL Construction ---

/// Default location of the biometric match service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/biometric";

/// Represents the endpoints of the biometric match service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// Greeting that echoes `name`
    Hello { name: &'a str },
    /// Pairwise image comparison (multipart upload)
    MatchImages,
    /// Every stored comparison
    AllMatchScores,
}

impl Endpoint<'_> {
    /// Path segments appended to the base URL for this endpoint.
    fn segments(&self) -> Vec<&str> {
        match self {
            Self::Hello { name } => vec!["hello", *name],
            Self::MatchImages => vec!["image", "match"],
            Self::AllMatchScores => vec!["matchscore", "downloadFile", "all"],
        }
    }

    /// Resolves this endpoint against `base`.
    ///
    /// Each segment is percent-encoded as a single path segment, so `/`, `?`
    /// and `#` inside a name never change the request target.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClientError::InvalidPathSegment`] for the segments `.`
    /// and `..`, which a URL cannot carry literally, or when `base` cannot
    /// have a path appended.
    pub fn url(&self, base: &Url) -> Result<Url, MatchClientError> {
        let segments = self.segments();
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(MatchClientError::InvalidPathSegment((*bad).to_string()));
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| MatchClientError::InvalidPathSegment(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Parses a destination URL, keeping the offending string in the error.
///
/// # Errors
///
/// Returns [`MatchClientError::InvalidUrl`] when `url` is not an absolute URL.
pub fn parse_url(url: &str) -> Result<Url, MatchClientError> {
    Url::parse(url).map_err(|source| MatchClientError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        parse_url(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn test_endpoint_hello() {
        let url = Endpoint::Hello { name: "Viki" }.url(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/biometric/hello/Viki");
    }

    #[test]
    fn test_endpoint_hello_empty_name_is_passed_through() {
        let url = Endpoint::Hello { name: "" }.url(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/biometric/hello/");
    }

    #[test]
    fn test_endpoint_hello_encodes_reserved_characters() {
        let url = Endpoint::Hello {
            name: "a/b?c#d e%",
        }
        .url(&base())
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/biometric/hello/a%2Fb%3Fc%23d%20e%25"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_endpoint_hello_rejects_dot_segments() {
        for name in [".", ".."] {
            let err = Endpoint::Hello { name }.url(&base()).unwrap_err();
            assert!(matches!(err, MatchClientError::InvalidPathSegment(ref s) if s == name));
        }
    }

    #[test]
    fn test_endpoint_match_images() {
        let url = Endpoint::MatchImages.url(&base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/biometric/image/match");
    }

    #[test]
    fn test_endpoint_all_match_scores() {
        let url = Endpoint::AllMatchScores.url(&base()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/biometric/matchscore/downloadFile/all"
        );
    }

    #[test]
    fn test_endpoint_base_with_trailing_slash() {
        let base = parse_url("http://scores.example.com:9000/biometric/").unwrap();
        let url = Endpoint::MatchImages.url(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "http://scores.example.com:9000/biometric/image/match"
        );
    }

    #[test]
    fn test_endpoint_rejects_cannot_be_a_base() {
        let base = parse_url("mailto:someone@example.com").unwrap();
        assert!(matches!(
            Endpoint::MatchImages.url(&base),
            Err(MatchClientError::InvalidPathSegment(_))
        ));
    }

    #[test]
    fn test_parse_url_error_keeps_input() {
        let err = parse_url("/biometric/image/match").unwrap_err();
        match err {
            MatchClientError::InvalidUrl { url, .. } => {
                assert_eq!(url, "/biometric/image/match");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }
}
