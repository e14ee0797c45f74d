//! Sermon Analyzer: one structured-JSON call to the text model.
//!
//! The analyzer is thin on purpose. Prompt engineering lives in
//! [`crate::prompts`]; this module validates input, builds the request,
//! and turns the response into a [`SermonAnalysis`]. There is no retry: a
//! failure goes straight back to the user, who can resubmit.

use crate::analysis::SermonAnalysis;
use crate::config::SessionConfig;
use crate::error::{AnalysisError, ValidationError};
use crate::prompts::{analysis_prompt, analysis_response_schema, DEFAULT_SYSTEM_INSTRUCTION};
use crate::provider::{AnalysisRequest, SermonModel};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Minimum trimmed length, in characters, of text worth analysing.
pub const MIN_SERMON_CHARS: usize = 10;

/// Reject text whose trimmed length is below [`MIN_SERMON_CHARS`].
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    let chars = text.trim().chars().count();
    if chars < MIN_SERMON_CHARS {
        return Err(ValidationError::TooShort {
            chars,
            min: MIN_SERMON_CHARS,
        });
    }
    Ok(())
}

/// Build the analysis request for `text`.
pub fn build_request(text: &str, config: &SessionConfig) -> AnalysisRequest {
    AnalysisRequest {
        system_instruction: config
            .system_instruction
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        prompt: analysis_prompt(text.trim()),
        response_schema: analysis_response_schema(),
        temperature: config.temperature,
    }
}

/// Analyse a sermon manuscript.
///
/// Callers are expected to have run [`validate_text`] first.
///
/// The result has no `generated_images`. Points and prompts are truncated to
/// three; fewer are passed through as-is.
pub async fn analyze(
    model: &dyn SermonModel,
    text: &str,
    config: &SessionConfig,
) -> Result<SermonAnalysis, AnalysisError> {
    let start = Instant::now();
    let request = build_request(text, config);
    debug!(
        "Analysis request: {} prompt chars via {}",
        request.prompt.chars().count(),
        model.name()
    );

    let raw = model.generate_analysis(&request).await.map_err(|e| {
        warn!("Analysis call failed: {}", e);
        AnalysisError::Provider(e)
    })?;

    let analysis = parse_analysis(&raw).inspect_err(|e| {
        warn!("Analysis response rejected: {}", e.detail());
    })?;

    info!(
        "Analysed \"{}\": {} points, {} image prompts in {:?}",
        analysis.title,
        analysis.summary_points.len(),
        analysis.image_prompts.len(),
        start.elapsed()
    );
    Ok(analysis)
}

/// Parse a raw model response into a normalised [`SermonAnalysis`].
pub fn parse_analysis(raw: &str) -> Result<SermonAnalysis, AnalysisError> {
    let json = sanitize_json(raw);
    let mut analysis: SermonAnalysis =
        serde_json::from_str(json).map_err(|e| AnalysisError::MalformedResponse {
            detail: format!("invalid analysis JSON: {e}"),
            source: Some(Arc::new(e)),
        })?;

    if analysis.title.trim().is_empty() {
        return Err(AnalysisError::MalformedResponse {
            detail: "analysis has an empty title".into(),
            source: None,
        });
    }

    analysis.normalise();
    Ok(analysis)
}

/// Strip Markdown fences or leading/trailing prose around a JSON object.
///
/// Schema-constrained responses are normally bare JSON; this only matters
/// when a model ignores the mime type.
fn sanitize_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the first newline.
        let rest = match rest.split_once('\n') {
            Some((tag, body)) if !tag.contains('{') => body,
            _ => rest,
        };
        let body = rest.rfind("```").map_or(rest, |end| &rest[..end]);
        return body.trim();
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
