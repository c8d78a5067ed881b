use thiserror::Error;

use crate::error::ErrorKind;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("no file provided")]
    Missing,
    #[error("file must be a PDF (got {})", .content_type.as_deref().unwrap_or("no content type"))]
    InvalidFormat { content_type: Option<String> },
    #[error("file is {size} bytes, limit is {} bytes", MAX_UPLOAD_BYTES)]
    TooLarge { size: usize },
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Missing => ErrorKind::MissingInput,
            UploadError::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            UploadError::TooLarge { .. } => ErrorKind::SizeLimit,
        }
    }
}

fn validate_content_type(content_type: Option<&str>) -> Result<(), UploadError> {
    match content_type {
        Some(PDF_MIME_TYPE) => Ok(()),
        other => Err(UploadError::InvalidFormat {
            content_type: other.map(str::to_string),
        }),
    }
}

fn validate_size(size: usize) -> Result<(), UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

/// Accept a candidate upload only if it is declared as a PDF and fits the
/// size limit. Media type is checked first, so a non-PDF is refused whatever
/// its size.
///
/// The server endpoint and the upload client both call this; the server's
/// verdict is the one that counts. The server calls it with a size of zero
/// to vet the part headers before reading, then with the running total as
/// the body streams in.
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), UploadError> {
    validate_content_type(content_type)?;
    validate_size(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_under_limit() {
        assert_eq!(validate_upload(Some("application/pdf"), 1024), Ok(()));
        assert_eq!(validate_upload(Some("application/pdf"), MAX_UPLOAD_BYTES), Ok(()));
    }

    #[test]
    fn rejects_other_types_regardless_of_size() {
        for size in [0, 10, MAX_UPLOAD_BYTES + 1, usize::MAX] {
            for content_type in [Some("text/plain"), Some("application/PDF"), Some("application/pdf; charset=binary"), None] {
                let err = validate_upload(content_type, size).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidFormat);
            }
        }
    }

    #[test]
    fn rejects_oversize_pdf() {
        let err = validate_upload(Some(PDF_MIME_TYPE), MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err, UploadError::TooLarge { size: MAX_UPLOAD_BYTES + 1 });
        assert_eq!(err.kind(), ErrorKind::SizeLimit);
    }

    #[test]
    fn limit_is_ten_mebibytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 10_485_760);
    }

    #[test]
    fn missing_maps_to_missing_input() {
        assert_eq!(UploadError::Missing.kind(), ErrorKind::MissingInput);
    }
}
