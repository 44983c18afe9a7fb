//! Result types returned by the biometric match service.

use serde::{Deserialize, Serialize};

/// Score for a single pairwise image comparison.
///
/// Decoded from the `/image/match` response object
/// `{"matchResult": 6.0, "fileName1": "1.png", "fileName2": "2.png"}`.
/// The score range is defined by the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScoreResult {
    /// Name of the first compared image as reported by the service
    pub file_name1: String,
    /// Name of the second compared image as reported by the service
    pub file_name2: String,
    #[serde(rename = "matchResult", alias = "matchScore")]
    pub match_score: f64,
}

/// One stored comparison from the service's score history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkScoreEntry {
    pub id: String,
    pub dir1: String,
    pub file1_name: String,
    pub dir2: String,
    pub file2_name: String,
    pub match_score: f64,
}

impl BulkScoreEntry {
    /// Returns the `(directory, filename)` pair of the first image.
    #[must_use]
    pub fn first_image(&self) -> (&str, &str) {
        (&self.dir1, &self.file1_name)
    }

    /// Returns the `(directory, filename)` pair of the second image.
    #[must_use]
    pub fn second_image(&self) -> (&str, &str) {
        (&self.dir2, &self.file2_name)
    }
}

/// Structured error body sent by the service alongside a non-success status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.timestamp.is_empty(), self.message.is_empty()) {
            (false, false) => write!(f, "{} ({})", self.message, self.timestamp),
            (true, false) => write!(f, "{}", self.message),
            (false, true) => write!(f, "unknown error ({})", self.timestamp),
            (true, true) => write!(f, "unknown error"),
        }
    }
}
