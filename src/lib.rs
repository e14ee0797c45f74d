//! # sermon-card
//!
//! Turn a Sunday sermon PDF into an illustrated evangelism summary.
//!
//! The text is pulled out of the PDF, a Gemini text model condenses it into a
//! structured summary (title, scripture, core theme, three points, an
//! invitation, keywords and three image prompts), and a Gemini image model
//! paints one illustration per point. The result renders as a single
//! **summary card** or a point-by-point **infographic**.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Extract     page text via pdfium (spawn_blocking)
//!  ├─ 3. Analyze     one structured-JSON call to the text model
//!  ├─ 4. Synthesize  three image calls, one at a time, fallback on failure
//!  └─ 5. View        summary card / infographic HTML
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sermon_card::{Session, SessionConfig, ViewType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Key read from GEMINI_API_KEY (or API_KEY)
//!     let mut session = Session::new(SessionConfig::default())?;
//!     session.submit_pdf("sermon.pdf").await?;
//!     session.set_view(ViewType::Infographic);
//!     println!("{}", session.render_page().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sermon-card` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! sermon-card = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{ImageRef, SermonAnalysis, SummaryPoint, ViewType};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{
    AnalysisError, ExtractionError, ImageSynthesisError, ProviderError, SermonError, SessionError,
    ValidationError,
};
pub use export::{save_images, write_atomic};
pub use pipeline::extract::ExtractedText;
pub use pipeline::load_sermon_text;
pub use progress::{NoopObserver, Observer, SessionObserver};
pub use provider::{AnalysisRequest, GeminiClient, ImageRequest, InlineImage, SermonModel};
pub use session::{Phase, PhaseKind, Session};
pub use view::{render_page, render_view};
