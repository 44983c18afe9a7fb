//! multipart/form-data encoding for image uploads.
//!
//! Each image becomes one part named `files` carrying the caller's path as its
//! filename and `image/png` as its content type. The file is streamed into the
//! body and the copied byte count is checked against the size seen at open
//! time, so a file that changes underneath the upload is reported instead of
//! being sent truncated.
//!
//! # Example
//!
//! ```no_run
//! use biometric_match_client::MultipartForm;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut form = MultipartForm::new();
//! form.add_file("images/1.png").await?;
//! form.add_file("images/2.png").await?;
//!
//! // The content type only becomes available once the closing boundary is written.
//! let encoded = form.finish();
//! println!("{} ({} bytes)", encoded.content_type(), encoded.len());
//! # Ok(())
//! # }
//! ```

use crate::errors::MatchClientError;
use bytes::Bytes;
use std::path::Path;
use tokio::io::AsyncRead;

/// Form field name used for every uploaded image.
pub const FORM_FIELD_NAME: &str = "files";

/// Content type declared for every uploaded image.
pub const PART_CONTENT_TYPE: &str = "image/png";

/// Random bytes behind a generated boundary (hex encoded to 60 characters).
const BOUNDARY_RANDOM_BYTES: usize = 30;

/// RFC 2046 limit on boundary length.
const MAX_BOUNDARY_LEN: usize = 70;

/// Characters that force the boundary to be quoted in the Content-Type header.
const BOUNDARY_NEEDS_QUOTING: &[char] = &[
    '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', ' ',
];

/// Headers of a single form part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartHeader {
    pub field_name: &'static str,
    /// Filename sent to the service, exactly as supplied by the caller.
    pub file_name: String,
    pub content_type: &'static str,
}

impl PartHeader {
    /// Header for an image part of the match upload.
    #[must_use]
    pub fn image(file_name: impl Into<String>) -> Self {
        Self {
            field_name: FORM_FIELD_NAME,
            file_name: file_name.into(),
            content_type: PART_CONTENT_TYPE,
        }
    }

    /// Renders the `Content-Disposition` value for this part.
    ///
    /// Non-ASCII filenames are sent both raw in `filename` and RFC 2231
    /// encoded in `filename*`.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        let mut value = format!(
            "form-data; name={}; filename={}",
            quote(self.field_name),
            quote(&self.file_name)
        );
        if !self.file_name.is_ascii() {
            value.push_str("; filename*=utf-8''");
            value.push_str(&urlencoding::encode(&self.file_name));
        }
        value
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"Content-Disposition: ");
        buf.extend_from_slice(self.content_disposition().as_bytes());
        buf.extend_from_slice(b"\r\nContent-Type: ");
        buf.extend_from_slice(self.content_type.as_bytes());
        buf.extend_from_slice(b"\r\n\r\n");
    }
}

/// Quotes a header parameter value.
///
/// CR and LF cannot appear inside a header line and are percent-encoded.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\r' => quoted.push_str("%0D"),
            '\n' => quoted.push_str("%0A"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn random_boundary() -> String {
    let bytes: [u8; BOUNDARY_RANDOM_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_valid_boundary(boundary: &str) -> bool {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN || boundary.ends_with(' ') {
        return false;
    }
    boundary.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(
                c,
                '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
            )
    })
}

/// A multipart/form-data body under construction.
///
/// Parts are appended in call order. [`finish`](Self::finish) writes the
/// closing delimiter and is the only way to obtain the body and its
/// content type.
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    buf: Vec<u8>,
    part_count: usize,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Creates an empty form with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: random_boundary(),
            buf: Vec::new(),
            part_count: 0,
        }
    }

    /// Creates an empty form with a caller-chosen boundary.
    ///
    /// # Errors
    ///
    /// Returns [`MatchClientError::InvalidBoundary`] unless the boundary is
    /// 1 to 70 RFC 2046 boundary characters and does not end with a space.
    pub fn with_boundary(boundary: impl Into<String>) -> Result<Self, MatchClientError> {
        let boundary = boundary.into();
        if !is_valid_boundary(&boundary) {
            return Err(MatchClientError::InvalidBoundary(boundary));
        }
        Ok(Self {
            boundary,
            buf: Vec::new(),
            part_count: 0,
        })
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Number of parts written so far.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    /// Streams the file at `path` into a new `files` part.
    ///
    /// The file handle is closed before this returns, on success and on
    /// every error path.
    ///
    /// # Errors
    ///
    /// - [`MatchClientError::OpenFile`] if the file cannot be opened
    /// - [`MatchClientError::FileInfo`] if its metadata cannot be read or it
    ///   is not a regular file
    /// - [`MatchClientError::WritePart`] if reading the file fails
    /// - [`MatchClientError::SizeMismatch`] if the bytes copied differ from
    ///   the size observed at open time
    ///
    /// A failed part leaves the form exactly as it was before the call.
    pub async fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), MatchClientError> {
        let path = path.as_ref();

        let mut file = tokio::fs::File::open(path).await.map_err(|source| {
            tracing::warn!("Failed to open file '{}': {}", path.display(), source);
            MatchClientError::OpenFile {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let metadata = file
            .metadata()
            .await
            .map_err(|source| MatchClientError::FileInfo {
                path: path.to_path_buf(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(MatchClientError::FileInfo {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ),
            });
        }

        let header = PartHeader::image(path.to_string_lossy());
        tracing::debug!(
            "Adding form part: file={}, size={} bytes",
            header.file_name,
            metadata.len()
        );

        self.write_part(&header, path, &mut file, metadata.len())
            .await
    }

    /// Writes one part whose body is read from `reader`, expecting exactly
    /// `expected_len` bytes.
    pub(crate) async fn write_part<R>(
        &mut self,
        header: &PartHeader,
        path: &Path,
        reader: &mut R,
        expected_len: u64,
    ) -> Result<(), MatchClientError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let checkpoint = self.buf.len();

        if self.part_count > 0 {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        header.write_to(&mut self.buf);

        match tokio::io::copy(reader, &mut self.buf).await {
            Ok(written) if written == expected_len => {
                self.part_count += 1;
                Ok(())
            }
            Ok(written) => {
                self.buf.truncate(checkpoint);
                Err(MatchClientError::SizeMismatch {
                    path: path.to_path_buf(),
                    expected: expected_len,
                    written,
                })
            }
            Err(source) => {
                self.buf.truncate(checkpoint);
                Err(MatchClientError::WritePart {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Writes the closing delimiter and returns the finished body.
    #[must_use]
    pub fn finish(mut self) -> EncodedForm {
        if self.part_count > 0 {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"--\r\n");

        let boundary = if self.boundary.contains(BOUNDARY_NEEDS_QUOTING) {
            format!("\"{}\"", self.boundary)
        } else {
            self.boundary
        };

        EncodedForm {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body: Bytes::from(self.buf),
            part_count: self.part_count,
        }
    }
}

/// A closed multipart body together with its `Content-Type` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedForm {
    content_type: String,
    body: Bytes,
    part_count: usize,
}

impl EncodedForm {
    /// The `multipart/form-data; boundary=...` header value.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.part_count
    }

    /// Length of the body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Encodes every file in `paths`, in order, as `files` parts.
///
/// An empty slice yields a body holding only the closing delimiter.
///
/// # Errors
///
/// Stops at the first file that fails; see [`MultipartForm::add_file`].
pub async fn encode_files<P: AsRef<Path>>(paths: &[P]) -> Result<EncodedForm, MatchClientError> {
    let mut form = MultipartForm::new();
    for path in paths {
        form.add_file(path).await?;
    }
    Ok(form.finish())
}
