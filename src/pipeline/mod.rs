//! Pipeline stages for turning a sermon PDF into an illustrated summary.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own. [`crate::session::Session`] strings them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ analyze ──▶ synthesize ×3
//! (path/URL)  (pdfium)   (text model)  (image model, sequential)
//! ```
//!
//! 1. [`input`]     : resolve the user-supplied path or URL to a local `.pdf`
//! 2. [`extract`]   : pull page text out with pdfium; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`analyze`]   : one structured-JSON call to the text model
//! 4. [`synthesize`]: one image call per prompt, with a fixed fallback per
//!    index when the call fails

pub mod analyze;
pub mod extract;
pub mod input;
pub mod synthesize;

use crate::config::SessionConfig;
use crate::error::ExtractionError;
use extract::ExtractedText;

/// Resolve `input` and extract its text.
///
/// The downloaded temp file, if any, is removed before returning.
pub async fn load_sermon_text(
    input: &str,
    config: &SessionConfig,
) -> Result<ExtractedText, ExtractionError> {
    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;
    extract::extract_text(resolved.path(), config.password.as_deref()).await
}
