//! The remote generative capability, behind a trait.
//!
//! [`SermonModel`] is the seam between the pipeline and the network. The
//! pipeline builds requests and interprets results; implementations only
//! move bytes. Tests substitute a scripted fake, production uses
//! [`gemini::GeminiClient`].

pub mod gemini;

use crate::config::SessionConfig;
use crate::error::ProviderError;
use serde_json::Value;
use std::sync::Arc;

pub use gemini::GeminiClient;

/// One structured-analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub system_instruction: String,
    pub prompt: String,
    /// JSON schema the response must satisfy.
    pub response_schema: Value,
    pub temperature: f32,
}

/// One image-generation request.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    /// e.g. `"1:1"`.
    pub aspect_ratio: String,
}

/// An image payload returned inline by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// The two operations the pipeline needs from a generative provider.
#[async_trait::async_trait]
pub trait SermonModel: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Run the analysis request and return the raw response text (JSON).
    async fn generate_analysis(&self, request: &AnalysisRequest) -> Result<String, ProviderError>;

    /// Run the image request.
    ///
    /// `Ok(None)` means the call succeeded but carried no inline image.
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<InlineImage>, ProviderError>;
}

/// Resolve the model, from most-specific to least-specific.
///
/// 1. **Pre-built model** (`config.model`): used as-is. This is how tests
///    and embedders inject their own implementation.
/// 2. **Explicit key** (`config.api_key`).
/// 3. **Environment**: `GEMINI_API_KEY`, then `API_KEY`.
pub fn resolve_model(config: &SessionConfig) -> Result<Arc<dyn SermonModel>, ProviderError> {
    if let Some(ref model) = config.model {
        return Ok(Arc::clone(model));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| non_empty_env("GEMINI_API_KEY"))
        .or_else(|| non_empty_env("API_KEY"))
        .ok_or_else(|| ProviderError::NotConfigured {
            hint: "Set GEMINI_API_KEY (or pass --api-key). \
                   Get a key from https://ai.google.dev/"
                .to_string(),
        })?;

    Ok(Arc::new(GeminiClient::new(api_key, config)?))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
