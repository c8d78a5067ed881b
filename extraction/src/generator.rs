use async_trait::async_trait;

use crate::error::ProviderError;

/// One structured-generation call: an instruction, a binary document and
/// the JSON schema the answer must conform to.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub instruction: &'a str,
    pub document: &'a [u8],
    pub mime_type: &'a str,
    pub schema: &'a serde_json::Value,
    /// Retries on transient failure, on top of the first attempt.
    pub max_retries: u32,
}

/// An external capability that turns a prompt plus document into an object
/// matching a schema.
///
/// Implementations own their retry policy; callers make exactly one call.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(
        &self,
        request: GenerationRequest<'_>,
    ) -> Result<serde_json::Value, ProviderError>;
}
