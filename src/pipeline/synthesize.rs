//! Image Synthesizer: one illustration per prompt, never failing.
//!
//! Every call yields an [`ImageRef`]. When the image model errors or returns
//! no inline payload, the fixed fallback for that index is used instead and
//! the cause is logged. Callers run the calls one after another; a batch of
//! concurrent image requests trips the provider's rate limit.

use crate::analysis::ImageRef;
use crate::error::ImageSynthesisError;
use crate::prompts::{image_prompt, FALLBACK_IMAGES, IMAGE_ASPECT_RATIO};
use crate::provider::{ImageRequest, InlineImage, SermonModel};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// The fallback illustration for `index`.
pub fn fallback_image(index: usize) -> ImageRef {
    ImageRef::Remote(FALLBACK_IMAGES[index % FALLBACK_IMAGES.len()].to_string())
}

/// Generate the illustration for `scene` at position `index`.
pub async fn synthesize(model: &dyn SermonModel, scene: &str, index: usize) -> ImageRef {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    synthesize_at(model, scene, index, now_ms).await
}

/// [`synthesize`] with an explicit clock, so prompts are reproducible.
pub async fn synthesize_at(
    model: &dyn SermonModel,
    scene: &str,
    index: usize,
    now_ms: u128,
) -> ImageRef {
    let start = Instant::now();
    match try_synthesize(model, scene, index, now_ms).await {
        Ok(image) => {
            info!(
                "Image {}: {} ({} b64 bytes) in {:?}",
                index,
                image.mime_type,
                image.data.len(),
                start.elapsed()
            );
            ImageRef::Inline {
                mime_type: image.mime_type,
                data: image.data,
            }
        }
        Err(e) => {
            warn!("{}; using fallback image", e);
            fallback_image(index)
        }
    }
}

async fn try_synthesize(
    model: &dyn SermonModel,
    scene: &str,
    index: usize,
    now_ms: u128,
) -> Result<InlineImage, ImageSynthesisError> {
    let request = ImageRequest {
        prompt: image_prompt(scene, index, now_ms),
        aspect_ratio: IMAGE_ASPECT_RATIO.to_string(),
    };
    debug!("Image {} prompt: {}", index, request.prompt);

    model
        .generate_image(&request)
        .await
        .map_err(|source| ImageSynthesisError::Provider { index, source })?
        .filter(|image| !image.data.is_empty())
        .ok_or(ImageSynthesisError::NoInlineData { index })
}
