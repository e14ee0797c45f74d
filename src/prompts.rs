//! Prompts, response schema, and fixed tables for the two model calls.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: changing the editorial rules or the image
//!    style requires editing exactly one place.
//!
//! 2. **Testability**: unit tests can inspect prompts directly without
//!    touching the network.
//!
//! Callers can override the system instruction via
//! [`crate::config::SessionConfig::system_instruction`]; the constants here are
//! used only when no override is provided.

use serde_json::{json, Value};

/// Default system instruction for the analysis call.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a careful summariser and art director who \
treats every word of Scripture and of the preacher's manuscript with respect. Never change the \
sermon's theme. Convey its original meaning faithfully, and on the visual side alternate between \
landscape, object, and light so the infographic stays varied.";

/// Editorial rules placed before the sermon text in the analysis prompt.
pub const ANALYSIS_INSTRUCTIONS: &str = r#"Below is the manuscript of a Sunday sermon. Use it to produce the content for an evangelism summary card and an infographic.

[Content analysis and summary rules (highest priority)]
1. Respect the original: do not change or distort the sermon's core theme, theological direction, or emphasis.
2. Main points: if the preacher states three main points, use them as they are. Otherwise summarise the sermon in three points by quoting the sentences that best represent its flow.
3. Keep the title: if the sermon title appears in the text, you must use that title.
4. No free interpretation: do not add anything absent from the text, and do not conclude in a direction the preacher did not intend.
5. Write every field except imagePrompts in the language of the sermon.

[Image prompt rules]
- imagePrompts must hold three completely different visual themes.
- 1 (introduction / setting): a vast natural landscape or outdoor space.
- 2 (core / lesson): a concrete symbol or object.
- 3 (conclusion / application): a warmly lit interior or the silhouette of a person.
- Keep every prompt in the style "High quality Christian art, warm sun rays, ethereal, peaceful", never repeat a subject, and write them in English."#;

/// Build the analysis prompt for a sermon manuscript.
pub fn analysis_prompt(sermon_text: &str) -> String {
    format!("{ANALYSIS_INSTRUCTIONS}\n\nManuscript:\n{sermon_text}")
}

/// JSON schema the analysis response must conform to.
///
/// Uses the Gemini `responseSchema` dialect (upper-case type names).
pub fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "scripture": { "type": "STRING" },
            "coreTheme": { "type": "STRING" },
            "summaryPoints": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["title", "description"]
                }
            },
            "imagePrompts": { "type": "ARRAY", "items": { "type": "STRING" } },
            "evangelismMessage": { "type": "STRING" },
            "keywords": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "title",
            "scripture",
            "coreTheme",
            "summaryPoints",
            "imagePrompts",
            "evangelismMessage",
            "keywords"
        ]
    })
}

/// Composition variations, selected by `index % 3`.
pub const IMAGE_VARIATIONS: [&str; 3] = [
    "Wide angle cinematic wide shot, grand scale, outdoor environment",
    "Extreme close-up macro photography focusing on texture and detail of an object",
    "Soft focus, dreamy portrait style with heavy bokeh and golden hour lighting",
];

/// Images substituted when synthesis fails, selected by `index % 3`.
pub const FALLBACK_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1470240731273-7821a6eeb6bd?q=80&w=1000",
    "https://images.unsplash.com/photo-1518531933037-91b2f5f229cc?q=80&w=1000",
    "https://images.unsplash.com/photo-1444491741275-3747c53c99b4?q=80&w=1000",
];

/// Aspect ratio requested for every illustration.
pub const IMAGE_ASPECT_RATIO: &str = "1:1";

/// Token that nudges the image model away from near-duplicates in one batch.
pub fn uniqueness_token(now_ms: u128, index: usize) -> String {
    format!("VariationID-{}-{}", now_ms % 1000, index)
}

/// Compose the final image prompt for illustration `index`.
pub fn image_prompt(scene: &str, index: usize, now_ms: u128) -> String {
    let composition = IMAGE_VARIATIONS[index % IMAGE_VARIATIONS.len()];
    format!(
        "[Art Style: Ethereal Christian Digital Art]. [Scene: {scene}]. \
         [Composition: {composition}]. [Lighting: Warm sunbeams, radiant]. \
         [Note: No text, no letters, highly distinct from other images, {}]",
        uniqueness_token(now_ms, index)
    )
}
