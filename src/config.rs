//! Configuration for talking to the conversion service.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The language and format here are only the
//! initial picks of a fresh [`crate::state::SelectionState`]; the user can
//! change them per upload.

use crate::artifact::{OutputFormat, RecognitionLanguage};
use crate::error::ImgTxtError;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};

/// Public conversion service used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://flask-image-to-txt-app.onrender.com";

/// Configuration for a conversion client.
///
/// # Example
/// ```rust
/// use imgtxt::{ClientConfig, Platform};
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:5000/")
///     .platform(Platform::Ios)
///     .timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://localhost:5000");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin of the conversion service, without trailing slash.
    pub base_url: String,

    /// Platform whose URI rules apply to the uploaded file part.
    /// Default: [`Platform::current()`].
    pub platform: Platform,

    /// Whole-request timeout in seconds. Default: None.
    ///
    /// `None` keeps reqwest's own default (no timeout), so a slow
    /// conversion is never cut short by the client.
    pub timeout_secs: Option<u64>,

    /// Initial recognition language. Default: `eng`.
    pub language: RecognitionLanguage,

    /// Initial output format. Default: `docx`.
    pub format: OutputFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            platform: Platform::current(),
            timeout_secs: None,
            language: RecognitionLanguage::default(),
            format: OutputFormat::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// `POST` target for uploads.
    pub fn upload_endpoint(&self) -> String {
        format!("{}/api/upload", self.base_url)
    }

    /// Public download endpoint for a generated file name.
    pub fn download_endpoint(&self, filename: &str) -> String {
        format!("{}/download/{}", self.base_url, filename)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn language(mut self, language: RecognitionLanguage) -> Self {
        self.config.language = language;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ImgTxtError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(ImgTxtError::InvalidConfig("base URL must not be empty".into()));
        }
        let parsed = reqwest::Url::parse(&c.base_url).map_err(|e| ImgTxtError::InvalidBaseUrl {
            url: c.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ImgTxtError::InvalidBaseUrl {
                url: c.base_url.clone(),
                reason: format!("scheme must be http or https, got '{}'", parsed.scheme()),
            });
        }
        if c.timeout_secs == Some(0) {
            return Err(ImgTxtError::InvalidConfig("timeout must be ≥ 1 second".into()));
        }
        Ok(self.config)
    }
}
