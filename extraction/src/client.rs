//! Client side of the upload: validate locally, then post to the service.
//!
//! Local validation only saves a round trip for obviously bad files. The
//! server runs the same checks again and its answer is final.

use crate::error::ErrorKind;
use crate::models::{ErrorResponse, ExtractionResult, Upload};
use crate::validation::{validate_upload, UploadError, PDF_MIME_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const UPLOAD_FIELD: &str = "pdf";
pub const PROCESS_PATH: &str = "/api/process-pdf";
pub const ERROR_KIND_HEADER: &str = "x-error-kind";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] UploadError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the upload ({status}): {message}")]
    Rejected {
        status: StatusCode,
        kind: Option<ErrorKind>,
        message: String,
    },
}

pub struct UploadClient {
    client: Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn process_url(&self) -> String {
        format!("{}{}", self.base_url, PROCESS_PATH)
    }

    /// Read a file from disk and run the shared upload checks on it.
    pub async fn prepare(&self, path: &Path) -> Result<Upload, ClientError> {
        let content_type = media_type_for(path);

        let metadata = tokio::fs::metadata(path).await.map_err(|source| ClientError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        validate_upload(content_type, size)?;

        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());

        Ok(Upload {
            filename,
            content_type: content_type.map(str::to_string),
            bytes,
        })
    }

    pub async fn submit(&self, upload: Upload) -> Result<ExtractionResult, ClientError> {
        let mime = upload.content_type.as_deref().unwrap_or(PDF_MIME_TYPE).to_string();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename.clone())
            .mime_str(&mime)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        log::info!("Uploading '{}' to {}", upload.filename, self.process_url());

        let response = self.client
            .post(self.process_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let kind = response
                .headers()
                .get(ERROR_KIND_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(ErrorKind::from_tag);
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => "PROCESSING FAILED".to_string(),
            };
            return Err(ClientError::Rejected { status, kind, message });
        }

        Ok(response.json().await?)
    }
}

/// Media type as a browser would declare it: by extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("pdf"))
        .map(|_| PDF_MIME_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{CannedResponse, TestServer};
    use crate::validation::MAX_UPLOAD_BYTES;
    use serde_json::json;
    use std::io::Write;

    fn sample_upload() -> Upload {
        Upload {
            filename: "report.pdf".to_string(),
            content_type: Some(PDF_MIME_TYPE.to_string()),
            bytes: b"%PDF-1.4 body".to_vec(),
        }
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_for(Path::new("a.pdf")), Some(PDF_MIME_TYPE));
        assert_eq!(media_type_for(Path::new("A.PDF")), Some(PDF_MIME_TYPE));
        assert_eq!(media_type_for(Path::new("a.txt")), None);
        assert_eq!(media_type_for(Path::new("pdf")), None);
    }

    #[test]
    fn process_url_joins_cleanly() {
        let client = UploadClient::new("http://localhost:3000/");
        assert_eq!(client.process_url(), "http://localhost:3000/api/process-pdf");
    }

    #[tokio::test]
    async fn prepare_reads_valid_pdf() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let client = UploadClient::new("http://localhost:3000");
        let upload = client.prepare(file.path()).await.unwrap();
        assert_eq!(upload.bytes, b"%PDF-1.4 test");
        assert_eq!(upload.content_type.as_deref(), Some(PDF_MIME_TYPE));
        assert!(upload.filename.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn prepare_rejects_non_pdf() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let client = UploadClient::new("http://localhost:3000");
        let err = client.prepare(file.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(UploadError::InvalidFormat { .. })));
    }

    #[tokio::test]
    async fn prepare_rejects_oversize_pdf() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.as_file().set_len(MAX_UPLOAD_BYTES as u64 + 1).unwrap();

        let client = UploadClient::new("http://localhost:3000");
        let err = client.prepare(file.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(UploadError::TooLarge { .. })));
    }

    #[tokio::test]
    async fn prepare_reports_missing_file() {
        let client = UploadClient::new("http://localhost:3000");
        let err = client.prepare(Path::new("/nonexistent/report.pdf")).await.unwrap_err();
        assert!(matches!(err, ClientError::Read { .. }));
    }

    #[tokio::test]
    async fn submit_posts_pdf_field_and_reads_result() {
        let server = TestServer::start(vec![CannedResponse::json(
            200,
            json!({ "headings": ["Intro"], "summary": "Short.", "filename": "report.pdf" }),
        )])
        .await;
        let client = UploadClient::new(&server.base_url);

        let result = client.submit(sample_upload()).await.unwrap();
        assert_eq!(result.headings, vec!["Intro".to_string()]);
        assert_eq!(result.summary, "Short.");
        assert_eq!(result.filename, "report.pdf");

        let request = &server.requests()[0];
        assert!(request.starts_with("POST /api/process-pdf HTTP/1.1"));
        assert!(request.contains(r#"name="pdf"; filename="report.pdf""#));
        assert!(request.contains("%PDF-1.4 body"));
    }

    #[tokio::test]
    async fn submit_surfaces_validation_rejection() {
        let server = TestServer::start(vec![CannedResponse::json(
            400,
            json!({ "error": "File must be a PDF" }),
        )
        .with_header(ERROR_KIND_HEADER, "invalid-format")])
        .await;
        let client = UploadClient::new(&server.base_url);

        match client.submit(sample_upload()).await.unwrap_err() {
            ClientError::Rejected { status, kind, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(kind, Some(ErrorKind::InvalidFormat));
                assert_eq!(message, "File must be a PDF");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_surfaces_quota_rejection() {
        let server = TestServer::start(vec![CannedResponse::json(
            429,
            json!({ "error": "API quota exceeded. Please check your API key." }),
        )
        .with_header(ERROR_KIND_HEADER, "quota-exceeded")])
        .await;
        let client = UploadClient::new(&server.base_url);

        match client.submit(sample_upload()).await.unwrap_err() {
            ClientError::Rejected { status, kind, message } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(kind, Some(ErrorKind::QuotaExceeded));
                assert_eq!(message, ErrorKind::QuotaExceeded.message());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_falls_back_when_error_body_is_not_json() {
        let server = TestServer::start(vec![CannedResponse::text(500, "gateway exploded")]).await;
        let client = UploadClient::new(&server.base_url);

        match client.submit(sample_upload()).await.unwrap_err() {
            ClientError::Rejected { status, kind, message } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(kind, None);
                assert_eq!(message, "PROCESSING FAILED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
