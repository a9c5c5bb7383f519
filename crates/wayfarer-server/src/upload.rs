//! Multipart image uploads.

use axum::extract::Multipart;
use axum::body::Bytes;

use crate::error::ApiError;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// An uploaded file with a name that is safe to store.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Sanitized file name.
    pub file_name: String,
    /// File contents.
    pub bytes: Bytes,
}

/// Reduce a client-supplied file name to ASCII letters, digits, `.`, `-`
/// and `_`. Directory components are discarded first.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] if nothing usable is left or the
/// result would be a hidden file.
pub fn sanitize_file_name(raw: &str) -> Result<String, ApiError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    if cleaned.is_empty() || cleaned.starts_with('.') {
        return Err(ApiError::InvalidInput(format!(
            "unusable file name {raw:?}"
        )));
    }
    Ok(cleaned)
}

/// Pull the `file` field out of a multipart body.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] if the body is malformed, has no
/// `file` field, or the field has no usable file name.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let raw_name = field.file_name().unwrap_or_default().to_owned();
        let file_name = sanitize_file_name(&raw_name)?;
        let bytes = field.bytes().await?;
        return Ok(Upload { file_name, bytes });
    }
    Err(ApiError::InvalidInput(format!(
        "multipart field {FILE_FIELD:?} is missing"
    )))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(sanitize_file_name("cover_01-b.JPG").unwrap(), "cover_01-b.JPG");
        assert_eq!(sanitize_file_name("my photo (1).png").unwrap(), "myphoto1.png");
    }

    #[test]
    fn strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\gate.jpg").unwrap(), "gate.jpg");
    }

    #[test]
    fn rejects_empty_and_hidden() {
        for name in ["", "豫园.", "..", ".htaccess", "dir/"] {
            assert!(
                matches!(sanitize_file_name(name), Err(ApiError::InvalidInput(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
