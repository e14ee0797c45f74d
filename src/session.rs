//! The orchestrator: a four-phase state machine around the pipeline.
//!
//! ```text
//!        submit ──▶ Analyzing ──ok──▶ GeneratingImages ──▶ Result
//!          ▲            │                                    │
//!          │          error                                  │
//!          │            ▼                                    │
//!        Idle ◀─────────┴──────────── go_home ───────────────┘
//! ```
//!
//! A `Session` is driven through `&mut self`, so only one operation is ever
//! in flight. The error banner lives inside [`Phase::Idle`] and the analysis
//! inside [`Phase::Result`]; neither can outlive its phase.

use crate::analysis::{SermonAnalysis, ViewType};
use crate::config::SessionConfig;
use crate::error::{SermonError, SessionError};
use crate::pipeline::analyze::{analyze, validate_text};
use crate::pipeline::load_sermon_text;
use crate::pipeline::synthesize::synthesize;
use crate::progress::{NoopObserver, Observer};
use crate::provider::{resolve_model, SermonModel};
use crate::view::{render_page, render_view};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Where a session currently is.
#[derive(Debug)]
pub enum Phase {
    /// Waiting for input. Holds the last failure until dismissed.
    Idle { error: Option<SessionError> },
    /// The analysis call is in flight.
    Analyzing,
    /// Illustrations are being generated, one at a time.
    GeneratingImages { completed: usize, total: usize },
    /// Terminal until [`Session::go_home`].
    Result { analysis: SermonAnalysis },
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle { .. } => PhaseKind::Idle,
            Phase::Analyzing => PhaseKind::Analyzing,
            Phase::GeneratingImages { .. } => PhaseKind::GeneratingImages,
            Phase::Result { .. } => PhaseKind::Result,
        }
    }
}

/// Data-free discriminant of [`Phase`], for observers and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Idle,
    Analyzing,
    GeneratingImages,
    Result,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseKind::Idle => "idle",
            PhaseKind::Analyzing => "analyzing",
            PhaseKind::GeneratingImages => "generating images",
            PhaseKind::Result => "result",
        })
    }
}

/// One user's pass from manuscript to illustrated summary.
///
/// # Example
/// ```rust,no_run
/// use sermon_card::{Session, SessionConfig};
///
/// # async fn run() -> Result<(), sermon_card::SermonError> {
/// let mut session = Session::new(SessionConfig::default())?;
/// let analysis = session.submit_pdf("sunday.pdf").await?;
/// println!("{}", analysis.title);
/// # Ok(())
/// # }
/// ```
pub struct Session {
    config: SessionConfig,
    model: Arc<dyn SermonModel>,
    observer: Observer,
    phase: Phase,
    view: ViewType,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("model", &self.model.name())
            .field("phase", &self.phase.kind())
            .field("view", &self.view)
            .finish()
    }
}

impl Session {
    /// Create an idle session, resolving the model from `config`.
    pub fn new(config: SessionConfig) -> Result<Self, SermonError> {
        let model =
            resolve_model(&config).map_err(|e| SermonError::InvalidConfig(e.to_string()))?;
        let observer = config
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(NoopObserver));
        info!("Session ready: model {}", model.name());
        Ok(Self {
            config,
            model,
            observer,
            phase: Phase::Idle { error: None },
            view: ViewType::default(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// The finished analysis. `Some` only in [`Phase::Result`].
    pub fn analysis(&self) -> Option<&SermonAnalysis> {
        match &self.phase {
            Phase::Result { analysis } => Some(analysis),
            _ => None,
        }
    }

    /// The pending error banner. `Some` only in [`Phase::Idle`].
    pub fn error(&self) -> Option<&SessionError> {
        match &self.phase {
            Phase::Idle { error } => error.as_ref(),
            _ => None,
        }
    }

    pub fn view(&self) -> ViewType {
        self.view
    }

    /// Select the layout. Allowed in every phase; nothing is recomputed.
    pub fn set_view(&mut self, view: ViewType) {
        if self.view != view {
            debug!("View: {} → {}", self.view, view);
            self.view = view;
        }
    }

    /// Drop any result or error and return to an empty idle state.
    pub fn go_home(&mut self) {
        self.transition(Phase::Idle { error: None });
    }

    /// Clear the error banner, if one is shown.
    pub fn dismiss_error(&mut self) {
        if let Phase::Idle { error } = &mut self.phase {
            *error = None;
        }
    }

    /// Render the current view as an HTML fragment, if there is a result.
    pub fn render(&self) -> Option<String> {
        self.analysis().map(|a| render_view(a, self.view))
    }

    /// Render a standalone page with both layouts, if there is a result.
    pub fn render_page(&self) -> Option<String> {
        self.analysis().map(|a| render_page(a, self.view))
    }

    /// Read a sermon PDF from a path or URL and analyse it.
    ///
    /// Upload problems are returned without changing phase or setting the
    /// error banner. From extraction onwards this is [`Session::submit_text`].
    pub async fn submit_pdf(&mut self, input: &str) -> Result<&SermonAnalysis, SermonError> {
        self.ensure_idle("submit a PDF")?;

        let extracted = load_sermon_text(input, &self.config).await?;
        self.observer
            .on_text_extracted(extracted.page_count, extracted.trimmed_chars());
        let chars = extracted.ensure_text()?;
        info!(
            "Extracted {} chars from {} pages",
            chars, extracted.page_count
        );

        self.submit_text(&extracted.text).await
    }

    /// Analyse `text`, illustrate it, and move to [`Phase::Result`].
    ///
    /// Too-short text and analysis failures leave the session idle with the
    /// error recorded. Image failures never fail the call; they are replaced
    /// by fallbacks.
    pub async fn submit_text(&mut self, text: &str) -> Result<&SermonAnalysis, SermonError> {
        self.ensure_idle("analyze")?;

        if let Err(e) = validate_text(text) {
            info!("Rejected input: {}", e);
            self.phase = Phase::Idle {
                error: Some(e.clone().into()),
            };
            return Err(e.into());
        }

        let start = Instant::now();
        self.transition(Phase::Analyzing);

        let analysis = match analyze(self.model.as_ref(), text, &self.config).await {
            Ok(analysis) => analysis,
            Err(e) => {
                self.transition(Phase::Idle {
                    error: Some(e.clone().into()),
                });
                return Err(e.into());
            }
        };

        let prompts = analysis.prompts_to_illustrate().to_vec();
        let total = prompts.len();
        self.transition(Phase::GeneratingImages {
            completed: 0,
            total,
        });

        let mut images = Vec::with_capacity(total);
        for (index, scene) in prompts.iter().enumerate() {
            self.observer.on_image_start(index, total);
            let image = synthesize(self.model.as_ref(), scene, index).await;
            let fallback = !image.is_inline();
            images.push(image);
            self.phase = Phase::GeneratingImages {
                completed: index + 1,
                total,
            };
            self.observer.on_image_complete(index, total, fallback);
        }

        let fallbacks = images.iter().filter(|i| !i.is_inline()).count();
        let analysis = analysis.with_images(images);
        info!(
            "Illustrated \"{}\": {} images ({} fallback) in {:?}",
            analysis.title,
            total,
            fallbacks,
            start.elapsed()
        );

        self.transition(Phase::Result { analysis });
        self.analysis()
            .ok_or_else(|| SermonError::Internal("result phase lost its analysis".into()))
    }

    fn ensure_idle(&self, action: &'static str) -> Result<(), SermonError> {
        match self.phase {
            Phase::Idle { .. } => Ok(()),
            _ => Err(SermonError::InvalidState {
                action,
                phase: self.phase.kind(),
            }),
        }
    }

    fn transition(&mut self, next: Phase) {
        let from = self.phase.kind();
        let to = next.kind();
        self.phase = next;
        if from != to {
            info!("Session: {} → {}", from, to);
            self.observer.on_phase_change(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_kind_display() {
        assert_eq!(PhaseKind::GeneratingImages.to_string(), "generating images");
        assert_eq!(PhaseKind::Idle.to_string(), "idle");
    }

    #[test]
    fn new_without_credentials_fails() {
        if std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("API_KEY").is_ok() {
            return;
        }
        let err = Session::new(SessionConfig::default()).unwrap_err();
        assert!(matches!(err, SermonError::InvalidConfig(_)));
    }
}
