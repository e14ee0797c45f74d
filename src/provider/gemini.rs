//! Google Gemini `generateContent` client.
//!
//! Both calls go to the same endpoint shape,
//! `POST {base}/models/{model}:generateContent`, with the key in the
//! `x-goog-api-key` header so it never appears in a logged URL.
//!
//! * Analysis asks for `application/json` output constrained by a
//!   `responseSchema`, and returns the concatenated text parts.
//! * Images ask for a single `1:1` picture and return the first `inlineData`
//!   part.

use super::{AnalysisRequest, ImageRequest, InlineImage, SermonModel};
use crate::config::SessionConfig;
use crate::error::ProviderError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client implementing [`SermonModel`].
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiClient {
    /// Build a client using the models, base URL, and timeout from `config`.
    pub fn new(api_key: impl Into<String>, config: &SessionConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transport {
                model: config.text_model.clone(),
                detail: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            timeout_secs: config.api_timeout_secs,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let start = Instant::now();
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        model: model.to_string(),
                        secs: self.timeout_secs,
                    }
                } else {
                    ProviderError::Transport {
                        model: model.to_string(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(model, status, body, retry_after_secs));
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    model: model.to_string(),
                    detail: e.to_string(),
                })?;

        debug!(
            "{}: {} candidate(s) in {:?}",
            model,
            parsed.candidates.len(),
            start.elapsed()
        );

        if let Some(err) = parsed.error {
            return Err(ProviderError::InvalidResponse {
                model: model.to_string(),
                detail: err.message,
            });
        }
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl SermonModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_analysis(&self, request: &AnalysisRequest) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            system_instruction: Some(Content::text(None, &request.system_instruction)),
            contents: vec![Content::text(Some("user"), &request.prompt)],
            generation_config: GenerationConfig {
                temperature: Some(request.temperature),
                response_mime_type: Some("application/json"),
                response_schema: Some(&request.response_schema),
                image_config: None,
            },
        };

        let response = self.generate(&self.text_model, &body).await?;
        response_text(&response).ok_or_else(|| ProviderError::Empty {
            model: self.text_model.clone(),
        })
    }

    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<Option<InlineImage>, ProviderError> {
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), &request.prompt)],
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: None,
                response_schema: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: &request.aspect_ratio,
                }),
            },
        };

        let response = self.generate(&self.image_model, &body).await?;
        Ok(response_image(&response))
    }
}

fn status_error(
    model: &str,
    status: StatusCode,
    body: String,
    retry_after_secs: Option<u64>,
) -> ProviderError {
    let model = model.to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth {
            model,
            detail: api_error_message(&body).unwrap_or(body),
        },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
            model,
            retry_after_secs,
        },
        _ => ProviderError::Http {
            model,
            status: status.as_u16(),
            body: api_error_message(&body).unwrap_or(body),
        },
    }
}

/// Pull `error.message` out of a Gemini error body, if it is one.
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map(|e| e.message)
}

/// Concatenate the non-thought text parts of the first candidate.
fn response_text(response: &GenerateContentResponse) -> Option<String> {
    let parts = &response.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts
        .iter()
        .filter(|p| !p.thought.unwrap_or(false))
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First inline image part of the first candidate.
fn response_image(response: &GenerateContentResponse) -> Option<InlineImage> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .iter()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|blob| !blob.data.is_empty())
        .map(|blob| InlineImage {
            mime_type: blob
                .mime_type
                .clone()
                .unwrap_or_else(|| "image/png".to_string()),
            data: blob.data.clone(),
        })
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

impl<'a> Content<'a> {
    fn text(role: Option<&'a str>, text: &'a str) -> Self {
        Self {
            role,
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<Blob>,
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    #[serde(alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
