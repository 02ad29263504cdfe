//! Upload client for the conversion service.
//!
//! One upload is one `POST {base_url}/api/upload` with a multipart body:
//!
//! | field      | content                                   |
//! |------------|-------------------------------------------|
//! | `file`     | artifact bytes, file name, MIME type      |
//! | `language` | [`RecognitionLanguage::code`], verbatim   |
//! | `format`   | [`OutputFormat::code`], verbatim          |
//!
//! The reply is `{ "text"?: string, "download_url"?: string }`. The service's
//! `download_url` points at an internal location; only its last path segment
//! is kept and re-rooted on `{base_url}/download/`.
//!
//! Request construction and reply interpretation are pure functions so they
//! can be tested without a network. [`ConversionService`] is the seam the
//! screen talks to; [`HttpConversionService`] is the reqwest implementation.

use crate::artifact::{ConversionResult, InputArtifact, OutputFormat, RecognitionLanguage};
use crate::config::ClientConfig;
use crate::error::ImgTxtError;
use crate::output::write_atomic;
use crate::platform::{normalize_artifact_uri, Platform};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The `file` part of an upload, after platform URI normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// URI as sent to the service, after platform normalisation.
    pub uri: String,
    /// URI the artifact was acquired under; the bytes are read from here.
    pub source_uri: String,
    pub file_name: String,
    pub mime_type: String,
}

/// A fully built upload, ready to hand to a [`ConversionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: FilePart,
    pub language: RecognitionLanguage,
    pub format: OutputFormat,
}

impl UploadRequest {
    pub fn new(
        artifact: &InputArtifact,
        language: RecognitionLanguage,
        format: OutputFormat,
        platform: Platform,
    ) -> Self {
        Self {
            file: FilePart {
                uri: normalize_artifact_uri(artifact.uri(), platform),
                source_uri: artifact.uri().to_string(),
                file_name: artifact.name().to_string(),
                mime_type: artifact.effective_mime_type().to_string(),
            },
            language,
            format,
        }
    }

    /// The non-file form fields, in the order they are appended.
    pub fn text_fields(&self) -> [(&'static str, &'static str); 2] {
        [
            ("language", self.language.code()),
            ("format", self.format.code()),
        ]
    }
}

/// Body of a 2xx reply from the upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl UploadResponse {
    /// Parse a reply body. A body that is not the expected JSON object is
    /// treated as a reply carrying neither text nor link.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Upload reply is not the expected JSON ({e}); treating it as empty");
                Self::default()
            }
        }
    }
}

/// Trailing path segment of the service's `download_url`, unvalidated.
pub fn download_filename(download_url: &str) -> &str {
    download_url.rsplit('/').next().unwrap_or(download_url)
}

/// File name to save a download under: the URL's last segment without
/// query or fragment. `.` and `..` are refused.
pub fn local_download_name(download_url: &str) -> Result<&str, String> {
    let segment = download_filename(download_url);
    let name = segment.split(['?', '#']).next().unwrap_or_default();
    match name {
        "" => Ok("download"),
        "." | ".." => Err(format!("refusing to save as '{name}'")),
        n => Ok(n),
    }
}

/// Turn a successful reply into the result shown to the user.
pub fn interpret_response(config: &ClientConfig, response: UploadResponse) -> ConversionResult {
    let download_url = response
        .download_url
        .filter(|u| !u.is_empty())
        .map(|u| config.download_endpoint(download_filename(&u)));
    ConversionResult {
        recognized_text: response.text.unwrap_or_default(),
        download_url,
    }
}

/// Anything that can carry an [`UploadRequest`] to the conversion service.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Send one upload. Transport errors and non-2xx replies are
    /// [`ImgTxtError::UploadFailed`].
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ImgTxtError>;
}

/// Upload `artifact` and interpret the reply.
pub async fn convert(
    service: &dyn ConversionService,
    config: &ClientConfig,
    artifact: &InputArtifact,
    language: RecognitionLanguage,
    format: OutputFormat,
) -> Result<ConversionResult, ImgTxtError> {
    let request = UploadRequest::new(artifact, language, format, config.platform);
    debug!(
        "Uploading '{}' ({}) language={} format={}",
        request.file.file_name, request.file.mime_type, language, format
    );
    let response = service.upload(&request).await?;
    let result = interpret_response(config, response);
    info!(
        "Upload complete: {} chars of text, download link: {}",
        result.recognized_text.len(),
        result.download_url.is_some()
    );
    Ok(result)
}

// ── reqwest implementation ───────────────────────────────────────────────

/// Resolve an upload URI to a filesystem path.
///
/// `file://` URIs are decoded (percent escapes included); anything else is
/// taken as a path as-is.
fn local_path(uri: &str) -> PathBuf {
    reqwest::Url::parse(uri)
        .ok()
        .filter(|u| u.scheme() == "file")
        .and_then(|u| u.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(uri))
}

/// [`ConversionService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpConversionService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpConversionService {
    pub fn new(config: ClientConfig) -> Result<Self, ImgTxtError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ImgTxtError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a derived download URL into `dest_dir`, keeping its file name.
    pub async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, ImgTxtError> {
        let failed = |reason: String| ImgTxtError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let name = local_download_name(url).map_err(failed)?;

        info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }
        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

        let path = dest_dir.join(name);
        write_atomic(&path, &bytes).await?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[async_trait]
impl ConversionService for HttpConversionService {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ImgTxtError> {
        let path = local_path(&request.file.source_uri);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ImgTxtError::upload(format!("cannot read '{}': {e}", path.display())))?;

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(request.file.file_name.clone())
            .mime_str(&request.file.mime_type)
            .map_err(|e| ImgTxtError::upload(format!("bad MIME type: {e}")))?;
        let form = request
            .text_fields()
            .into_iter()
            .fold(reqwest::multipart::Form::new().part("file", part), |form, (k, v)| {
                form.text(k, v)
            });

        let endpoint = self.config.upload_endpoint();
        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImgTxtError::upload(format!("request to {endpoint} timed out"))
                } else {
                    ImgTxtError::upload(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ImgTxtError::upload(format!("reading reply: {e}")))?;
        if !status.is_success() {
            warn!("Upload rejected with HTTP {status}: {body}");
            return Err(ImgTxtError::upload(format!("HTTP {status}")));
        }
        debug!("Upload reply: {} bytes", body.len());
        Ok(UploadResponse::from_body(&body))
    }
}
