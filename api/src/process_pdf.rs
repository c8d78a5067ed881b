use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use pdf_extraction::client::UPLOAD_FIELD;
use pdf_extraction::{validate_upload, ErrorKind, ExtractionResult, ExtractionService, Upload, UploadError};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExtractionService>,
    pub request_timeout: Duration,
}

/// `POST /api/process-pdf`
///
/// Validates the `pdf` part, runs one extraction and returns
/// `{ headings, summary, filename }`. The whole request, provider call
/// included, is bounded by `request_timeout`.
pub async fn process_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let multipart = multipart.map_err(|e| {
        log::warn!("[{}] rejected: {}", request_id, e);
        ApiError::from(UploadError::Missing)
    })?;

    match tokio::time::timeout(state.request_timeout, handle(&state, multipart, request_id)).await {
        Ok(result) => result,
        Err(_) => {
            log::error!(
                "[{}] timed out after {:?}",
                request_id,
                state.request_timeout
            );
            Err(ApiError::new(ErrorKind::UnknownProcessingError))
        }
    }
}

async fn handle(
    state: &AppState,
    mut multipart: Multipart,
    request_id: Uuid,
) -> Result<Json<ExtractionResult>, ApiError> {
    let upload = read_upload(&mut multipart).await.map_err(|e| {
        log::warn!("[{}] rejected: {}", request_id, e);
        ApiError::from(e)
    })?;

    log::info!(
        "[{}] processing '{}' ({} bytes)",
        request_id,
        upload.filename,
        upload.size()
    );

    let result = state
        .service
        .extract(&upload.filename, &upload.bytes)
        .await
        .map_err(|e| {
            log::error!("[{}] extraction failed ({}): {}", request_id, e.kind(), e);
            ApiError::from(e)
        })?;

    log::info!("[{}] done", request_id);
    Ok(Json(result))
}

/// Pull the `pdf` part out of the form.
///
/// The media type is checked from the part headers before any of its body
/// is read, and the body is read chunk by chunk so an oversize file is
/// refused as soon as it crosses the limit.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, UploadError> {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::Missing),
            Err(e) => {
                log::warn!("malformed multipart body: {}", e);
                return Err(UploadError::Missing);
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        validate_upload(content_type.as_deref(), 0)?;

        // A part without a filename is a plain form value, not a file.
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| UploadError::InvalidFormat {
                content_type: content_type.clone(),
            })?;

        let mut bytes = Vec::new();
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    validate_upload(content_type.as_deref(), bytes.len() + chunk.len())?;
                    bytes.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("failed to read upload body: {}", e);
                    return Err(UploadError::Missing);
                }
            }
        }

        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }
}
