//! Error types for the sermon-card library.
//!
//! Failures fall into three tiers:
//!
//! * [`SermonError`]: **Fatal for the current request**: returned as
//!   `Err(SermonError)` from [`crate::session::Session`] and the export
//!   helpers. Wraps the user-facing kinds below.
//!
//! * [`ValidationError`], [`AnalysisError`], [`ExtractionError`]: the
//!   user-facing kinds. Their `Display` text is what the CLI prints.
//!   [`AnalysisError`] always shows the same fixed message; the transport or
//!   parse cause is kept as its `source()`. [`SessionError`] is the subset a
//!   session keeps as its dismissible error.
//!
//! * [`ImageSynthesisError`]: **Non-fatal**: a single image request failed.
//!   It never leaves [`crate::pipeline::synthesize`]; the synthesizer logs it
//!   and substitutes a fallback image instead.
//!
//! [`ProviderError`] is the transport-level error produced by a
//! [`crate::provider::SermonModel`] and is wrapped by the analysis and image
//! error kinds.

use crate::session::PhaseKind;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Message shown to the user for every analysis failure.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "AI analysis failed. Make sure the sermon text is substantial, then try again.";

/// All fatal errors returned by the sermon-card library.
#[derive(Debug, Error)]
pub enum SermonError {
    /// Input text rejected before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The text model call failed or returned an unusable response.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The PDF could not be read or held no usable text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// An operation was attempted from a phase that does not allow it.
    #[error("Cannot {action} while the session is {phase}; go home first")]
    InvalidState {
        action: &'static str,
        phase: PhaseKind,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Input text is too short to be worth analysing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "The sermon text is too short ({chars} characters, need at least {min}). \
         Add more of the sermon for a meaningful summary."
    )]
    TooShort { chars: usize, min: usize },
}

/// The analysis call failed. `Display` is always [`ANALYSIS_FAILED_MESSAGE`].
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// The provider call itself failed.
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Provider(#[source] ProviderError),

    /// The provider answered but the body was not a valid analysis.
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    MalformedResponse {
        detail: String,
        #[source]
        source: Option<Arc<serde_json::Error>>,
    },
}

impl AnalysisError {
    /// Technical description of the cause, for logs.
    pub fn detail(&self) -> String {
        match self {
            AnalysisError::Provider(e) => e.to_string(),
            AnalysisError::MalformedResponse { detail, .. } => detail.clone(),
        }
    }
}

/// The dismissible error a session holds while idle.
///
/// Only failures of a submitted sermon are kept here; problems reading an
/// upload are returned to the caller without touching the session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl From<SessionError> for SermonError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(e) => SermonError::Validation(e),
            SessionError::Analysis(e) => SermonError::Analysis(e),
        }
    }
}

/// Errors while turning an uploaded file into sermon text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file name does not end in `.pdf`.
    #[error("Only PDF files can be uploaded: '{name}'")]
    NotAPdf { name: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
         Set PDFIUM_LIB_PATH=/path/to/libpdfium, place libpdfium next to the \
         working directory, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    /// Extraction succeeded but produced (almost) nothing.
    #[error(
        "No text could be extracted from the PDF ({chars} characters). \
         Make sure the PDF contains selectable text rather than scanned images."
    )]
    NoText { chars: usize },

    #[error("Internal error while reading PDF: {0}")]
    Internal(String),
}

/// Transport-level failure talking to the generative model.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// No credential was found.
    #[error("Gemini is not configured.\n{hint}")]
    NotConfigured { hint: String },

    /// HTTP 401/403.
    #[error("Authentication error from '{model}': {detail}")]
    Auth { model: String, detail: String },

    /// HTTP 429.
    #[error(
        "Rate limit exceeded for '{model}'{}",
        retry_after_secs.map(|s| format!("; retry after {s}s")).unwrap_or_default()
    )]
    RateLimited {
        model: String,
        retry_after_secs: Option<u64>,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to '{model}' timed out after {secs}s")]
    Timeout { model: String, secs: u64 },

    /// Any other non-success HTTP status.
    #[error("HTTP {status} from '{model}': {body}")]
    Http {
        model: String,
        status: u16,
        body: String,
    },

    /// Connection-level failure.
    #[error("Request to '{model}' failed: {detail}")]
    Transport { model: String, detail: String },

    /// The body could not be decoded, or carried an API error object.
    #[error("Invalid response from '{model}': {detail}")]
    InvalidResponse { model: String, detail: String },

    /// The response contained no candidates or no text.
    #[error("'{model}' returned an empty response")]
    Empty { model: String },
}

/// A single image request failed. Absorbed by the synthesizer.
#[derive(Debug, Clone, Error)]
pub enum ImageSynthesisError {
    #[error("Image {index}: {source}")]
    Provider {
        index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("Image {index}: response carried no inline image data")]
    NoInlineData { index: usize },
}
