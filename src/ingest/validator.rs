//! Pure upload checks run before any bytes reach the codec.

use std::path::Path;

/// Hard server-side ceiling on upload size (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Size the client pre-checks against before uploading (10 MiB).
pub const DEFAULT_CLIENT_HINT_BYTES: u64 = 10 * 1024 * 1024;

/// File extensions accepted without looking at the content type.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Content types accepted without looking at the extension.
///
/// `application/octet-stream` is included because browsers commonly report
/// it for spreadsheet files.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
    "application/octet-stream",
];

/// Size limits applied to uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Uploads above this many bytes are rejected.
    pub max_bytes: u64,
    /// Advisory limit surfaced to clients; never enforced here.
    pub client_hint_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            client_hint_bytes: DEFAULT_CLIENT_HINT_BYTES,
        }
    }
}

/// What the validator needs to know about an upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadMeta<'a> {
    /// Original file name as sent by the client.
    pub file_name: &'a str,
    /// Declared content type, if any.
    pub content_type: Option<&'a str>,
    /// Payload size in bytes.
    pub size: u64,
    /// Companion `month` form field.
    pub month: Option<&'a str>,
    /// Companion `year` form field.
    pub year: Option<&'a str>,
}

/// Why an upload was refused. Exactly one reason is reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Payload exceeds the server ceiling.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// Neither the extension nor the content type is allowed.
    #[error("only Excel (.xlsx, .xls) and CSV files are allowed: {file_name}")]
    UnsupportedType {
        /// Rejected file name.
        file_name: String,
        /// Rejected content type.
        content_type: Option<String>,
    },

    /// A required companion field is absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The request carried no file part.
    #[error("no file uploaded")]
    MissingFile,
}

/// Checks an upload against `limits`.
///
/// Checks run in a fixed order (size, then type, then required fields) and
/// the first failure is returned. The type check passes if *either* the
/// extension or the content type is allowed.
///
/// # Errors
///
/// Returns the first [`Rejection`] that applies.
pub fn validate(meta: &UploadMeta<'_>, limits: &UploadLimits) -> Result<(), Rejection> {
    if meta.size > limits.max_bytes {
        return Err(Rejection::TooLarge {
            size: meta.size,
            limit: limits.max_bytes,
        });
    }

    if !has_allowed_extension(meta.file_name) && !has_allowed_content_type(meta.content_type) {
        return Err(Rejection::UnsupportedType {
            file_name: meta.file_name.to_string(),
            content_type: meta.content_type.map(str::to_string),
        });
    }

    for (name, value) in [("month", meta.month), ("year", meta.year)] {
        if value.is_none_or(|v| v.trim().is_empty()) {
            return Err(Rejection::MissingField(name));
        }
    }

    Ok(())
}

fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

fn has_allowed_content_type(content_type: Option<&str>) -> bool {
    let Some(mime) = content_type.and_then(|ct| ct.split(';').next()) else {
        return false;
    };
    let mime = mime.trim();
    ALLOWED_CONTENT_TYPES
        .iter()
        .any(|allowed| mime.eq_ignore_ascii_case(allowed))
}
