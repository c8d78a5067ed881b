use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pdf_extraction::{ErrorKind, ErrorResponse, ExtractionError, UploadError};

pub use pdf_extraction::client::ERROR_KIND_HEADER;

/// A failed request: the body carries the user-facing message, the
/// `x-error-kind` header carries the machine-readable kind.
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
}

impl ApiError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            kind if kind.is_client_error() => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimited | ErrorKind::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind.message().to_string(),
        };

        let mut response = (self.status(), Json(body)).into_response();
        response.headers_mut().insert(
            ERROR_KIND_HEADER,
            HeaderValue::from_static(self.kind.as_str()),
        );
        response
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self::new(err.kind())
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        Self::new(err.kind())
    }
}
