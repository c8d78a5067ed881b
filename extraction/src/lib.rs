pub mod models;
pub mod validation;
pub mod error;
pub mod cleanup;
pub mod generator;
pub mod gemini_service;
pub mod extraction_service;
pub mod client;

pub use models::*;
pub use validation::{validate_upload, UploadError, MAX_UPLOAD_BYTES, PDF_MIME_TYPE};
pub use error::{ErrorKind, ExtractionError, ProviderError};
pub use cleanup::clean_text;
pub use generator::{GenerationRequest, StructuredGenerator};
pub use gemini_service::{GeminiConfig, GeminiService};
pub use extraction_service::ExtractionService;
pub use client::{ClientError, UploadClient};

#[cfg(test)]
mod test_server;
