use crate::error::ExtractionError;
use crate::generator::{GenerationRequest, StructuredGenerator};
use crate::models::*;
use crate::validation::PDF_MIME_TYPE;
use serde_json::json;
use std::sync::Arc;

/// Retries the generator may spend on transient provider failures.
pub const MAX_RETRIES: u32 = 3;

const INSTRUCTION: &str = r#"Please analyze this PDF document and provide:

1. Extract all headings, titles, and section headers. Return them as clean text without any markdown formatting (no **, __, *, etc.). Focus on identifying clear structural elements like chapter titles, section headings, and major topic headers.

2. Generate a comprehensive summary of the document's content. Write in plain text without any markdown formatting. Provide a concise but thorough overview of the main topics, key points, and overall purpose of the document.

Important: Return all text in plain format without any markdown symbols, asterisks, underscores, or other formatting characters. Keep the response clean and readable."#;

pub struct ExtractionService {
    generator: Arc<dyn StructuredGenerator>,
    schema: serde_json::Value,
}

impl ExtractionService {
    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self {
            generator,
            schema: outline_schema(),
        }
    }

    /// Run one extraction. Nothing is cached: every call reaches the model.
    pub async fn extract(&self, filename: &str, document: &[u8]) -> Result<ExtractionResult, ExtractionError> {
        let start_time = std::time::Instant::now();

        let value = self.generator
            .generate(GenerationRequest {
                instruction: INSTRUCTION,
                document,
                mime_type: PDF_MIME_TYPE,
                schema: &self.schema,
                max_retries: MAX_RETRIES,
            })
            .await?;

        let outline: DocumentOutline =
            serde_json::from_value(value).map_err(ExtractionError::SchemaViolation)?;

        log::info!(
            "Extracted {} headings from '{}' in {}ms",
            outline.headings.len(),
            filename,
            start_time.elapsed().as_millis()
        );

        Ok(ExtractionResult::from_outline(outline, filename))
    }
}

/// Response schema in the OpenAPI subset Gemini accepts.
pub fn outline_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "headings": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Array of extracted headings and section titles from the document in plain text format"
            },
            "summary": {
                "type": "STRING",
                "description": "Comprehensive summary of the document content in plain text format, highlighting main topics and key points"
            }
        },
        "required": ["headings", "summary"],
        "propertyOrdering": ["headings", "summary"]
    })
}
