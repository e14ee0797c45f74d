//! Configuration for a sermon-card session.
//!
//! All behaviour is controlled through [`SessionConfig`], built via its
//! [`SessionConfigBuilder`]. Keeping every knob in one struct makes it easy to
//! share a config between the CLI and library callers and to log it (the
//! `Debug` impl redacts the API key).

use crate::error::SermonError;
use crate::progress::Observer;
use crate::provider::gemini::DEFAULT_BASE_URL;
use crate::provider::SermonModel;
use std::fmt;
use std::sync::Arc;

/// Default model for the analysis call.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Default model for the image calls.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Configuration for a [`crate::session::Session`].
///
/// # Example
/// ```rust
/// use sermon_card::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .text_model("gemini-2.5-flash")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(config.text_model, "gemini-2.5-flash");
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    /// Model used for the structured analysis. Default: [`DEFAULT_TEXT_MODEL`].
    pub text_model: String,

    /// Model used for illustrations. Default: [`DEFAULT_IMAGE_MODEL`].
    pub image_model: String,

    /// API root. Default: the public Gemini v1beta endpoint.
    pub api_base_url: String,

    /// API key. If None, read from `GEMINI_API_KEY`, then `API_KEY`.
    pub api_key: Option<String>,

    /// Pre-constructed model. Takes precedence over the key and model names.
    pub model: Option<Arc<dyn SermonModel>>,

    /// Sampling temperature for the analysis call. Default: 0.4.
    ///
    /// Low enough that points are quoted rather than paraphrased, high enough
    /// that image prompts vary across sermons.
    pub temperature: f32,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Image generation routinely takes 10–30 s per picture.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Password for encrypted PDFs.
    pub password: Option<String>,

    /// Custom system instruction for the analysis. If None, uses the built-in one.
    pub system_instruction: Option<String>,

    /// Progress observer.
    pub observer: Option<Observer>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: None,
            temperature: 0.4,
            api_timeout_secs: 120,
            download_timeout_secs: 120,
            password: None,
            system_instruction: None,
            observer: None,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("temperature", &self.temperature)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("system_instruction", &self.system_instruction.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl SessionConfig {
    /// Create a new builder for `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: Arc<dyn SermonModel>) -> Self {
        self.config.model = Some(model);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.system_instruction = Some(instruction.into());
        self
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SessionConfig, SermonError> {
        let c = &self.config;
        if c.text_model.trim().is_empty() || c.image_model.trim().is_empty() {
            return Err(SermonError::InvalidConfig(
                "model names must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 || c.download_timeout_secs == 0 {
            return Err(SermonError::InvalidConfig(
                "timeouts must be ≥ 1 second".into(),
            ));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(SermonError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        Ok(self.config)
    }
}
