//! Domain types: the structured sermon summary and its illustrations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of summary points and illustrations consumed downstream.
pub const MAX_POINTS: usize = 3;

/// One of up to three structured sub-claims of the sermon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPoint {
    pub title: String,
    pub description: String,
}

/// The structured summary produced by the analyzer.
///
/// Field names follow the JSON contract sent to the text model, so the
/// model's response deserialises directly into this type.
///
/// `generated_images` is never read from input: it starts empty and is
/// attached exactly once by [`crate::session::Session`] after the image
/// phase. Entry `i` illustrates `image_prompts[i]` and `summary_points[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SermonAnalysis {
    pub title: String,
    pub scripture: String,
    pub core_theme: String,
    pub summary_points: Vec<SummaryPoint>,
    pub image_prompts: Vec<String>,
    pub evangelism_message: String,
    pub keywords: Vec<String>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    generated_images: Vec<ImageRef>,
}

impl SermonAnalysis {
    /// Illustrations in prompt order. Empty until the image phase completes.
    pub fn generated_images(&self) -> &[ImageRef] {
        &self.generated_images
    }

    /// The image for point `index`, if one was generated.
    pub fn image_at(&self, index: usize) -> Option<&ImageRef> {
        self.generated_images.get(index)
    }

    /// Prompts that will actually be illustrated (at most [`MAX_POINTS`]).
    pub fn prompts_to_illustrate(&self) -> &[String] {
        let n = self.image_prompts.len().min(MAX_POINTS);
        &self.image_prompts[..n]
    }

    /// Attach the generated images, consuming the entity.
    pub(crate) fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.generated_images = images;
        self
    }

    /// Truncate points and prompts to [`MAX_POINTS`] and drop duplicate
    /// keywords (first occurrence wins).
    pub(crate) fn normalise(&mut self) {
        self.summary_points.truncate(MAX_POINTS);
        self.image_prompts.truncate(MAX_POINTS);

        let mut seen = std::collections::HashSet::new();
        self.keywords
            .retain(|k| !k.trim().is_empty() && seen.insert(k.trim().to_lowercase()));
    }
}

/// A reference to an illustration: inline base64 data or a remote URL.
///
/// Serialises as the string an `<img src>` would take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ImageRef {
    /// Base64 payload returned by the image model.
    Inline { mime_type: String, data: String },
    /// A URL, used for the static fallbacks.
    Remote(String),
}

impl ImageRef {
    /// Value suitable for an HTML `src` attribute.
    pub fn src(&self) -> String {
        match self {
            ImageRef::Inline { mime_type, data } => format!("data:{mime_type};base64,{data}"),
            ImageRef::Remote(url) => url.clone(),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageRef::Inline { .. })
    }
}

impl From<ImageRef> for String {
    fn from(image: ImageRef) -> Self {
        image.src()
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        if let Some(rest) = s.strip_prefix("data:") {
            if let Some((mime_type, data)) = rest.split_once(";base64,") {
                return ImageRef::Inline {
                    mime_type: mime_type.to_string(),
                    data: data.to_string(),
                };
            }
        }
        ImageRef::Remote(s)
    }
}

/// The two peer layouts a result can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    /// Single evangelism card with the first illustration as background. (default)
    #[default]
    SummaryCard,
    /// Vertical timeline pairing each point with its illustration.
    Infographic,
}

impl ViewType {
    /// Stable identifier used in HTML ids and CLI values.
    pub fn slug(self) -> &'static str {
        match self {
            ViewType::SummaryCard => "summary-card",
            ViewType::Infographic => "infographic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewType::SummaryCard => "Summary card",
            ViewType::Infographic => "Infographic",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
