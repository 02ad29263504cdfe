//! Acquisition adapters: turn a document pick or a camera capture into an
//! [`InputArtifact`].
//!
//! The platform pickers themselves sit behind the [`DocumentPicker`] and
//! [`CameraCapture`] traits. [`pick_file`] and [`capture_from_camera`] hold
//! the rules that are the same on every platform: cancellation is not an
//! error, only the first picked document counts, camera captures get a
//! timestamped JPEG name.
//!
//! [`LocalDocumentPicker`] and [`LocalCamera`] back the traits with files on
//! disk for the CLI.

use crate::artifact::InputArtifact;
use crate::error::ImgTxtError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// MIME patterns offered to the document picker.
pub const ACCEPTED_TYPES: &[&str] = &["image/*", "application/pdf"];

/// Content type of every camera capture.
pub const CAMERA_MIME_TYPE: &str = "image/jpeg";

/// One entry returned by a document picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedDocument {
    pub uri: String,
    pub name: String,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(Vec<PickedDocument>),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured { uri: String },
    Cancelled,
}

/// A platform document chooser.
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    /// Let the user choose a document whose type matches one of `accept`.
    async fn pick(&self, accept: &[&str]) -> Result<PickOutcome, ImgTxtError>;
}

/// A platform camera.
#[async_trait]
pub trait CameraCapture: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus, ImgTxtError>;

    /// Take one still image.
    async fn capture(&self) -> Result<CaptureOutcome, ImgTxtError>;
}

/// Run the document picker. `Ok(None)` means the user cancelled.
pub async fn pick_file(picker: &dyn DocumentPicker) -> Result<Option<InputArtifact>, ImgTxtError> {
    let outcome = picker.pick(ACCEPTED_TYPES).await.map_err(into_acquisition)?;
    match outcome {
        PickOutcome::Cancelled => {
            debug!("Document pick cancelled");
            Ok(None)
        }
        PickOutcome::Picked(docs) => {
            let Some(first) = docs.into_iter().next() else {
                debug!("Document picker returned no documents");
                return Ok(None);
            };
            debug!("Picked document: {} ({})", first.name, first.uri);
            Ok(Some(InputArtifact::new(
                first.uri,
                first.name,
                first.mime_type.unwrap_or_default(),
            )))
        }
    }
}

/// Ask for camera permission, then capture. `Ok(None)` means cancelled.
pub async fn capture_from_camera(
    camera: &dyn CameraCapture,
) -> Result<Option<InputArtifact>, ImgTxtError> {
    match camera.request_permission().await.map_err(into_acquisition)? {
        PermissionStatus::Granted => {}
        PermissionStatus::Denied => {
            warn!("Camera permission denied");
            return Err(ImgTxtError::PermissionDenied);
        }
    }
    match camera.capture().await.map_err(into_acquisition)? {
        CaptureOutcome::Cancelled => {
            debug!("Camera capture cancelled");
            Ok(None)
        }
        CaptureOutcome::Captured { uri } => Ok(Some(camera_artifact(uri, SystemTime::now()))),
    }
}

/// Build the artifact for a capture taken at `captured_at`.
pub fn camera_artifact(uri: impl Into<String>, captured_at: SystemTime) -> InputArtifact {
    let millis = captured_at
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    InputArtifact::new(uri, format!("camera_{millis}.jpg"), CAMERA_MIME_TYPE)
}

/// Whether `mime` matches any pattern in `accept` (`type/*` wildcards allowed).
pub fn accepts(mime: &str, accept: &[&str]) -> bool {
    accept.iter().any(|pattern| match pattern.strip_suffix("/*") {
        Some(top) => mime
            .split_once('/')
            .is_some_and(|(t, _)| t.eq_ignore_ascii_case(top)),
        None => mime.eq_ignore_ascii_case(pattern),
    })
}

fn into_acquisition(err: ImgTxtError) -> ImgTxtError {
    match err {
        ImgTxtError::AcquisitionFailed { .. } | ImgTxtError::PermissionDenied => err,
        other => ImgTxtError::acquisition(other.to_string()),
    }
}

// ── Local filesystem adapters ────────────────────────────────────────────

/// `file://` URI for a local path, made absolute first.
async fn file_uri(path: &Path) -> Result<String, ImgTxtError> {
    let abs = tokio::fs::canonicalize(path).await.map_err(|e| {
        ImgTxtError::acquisition(format!("cannot open '{}': {e}", path.display()))
    })?;
    reqwest::Url::from_file_path(&abs)
        .map(String::from)
        .map_err(|_| ImgTxtError::acquisition(format!("'{}' is not a valid file path", abs.display())))
}

/// Document picker over a path chosen up front (e.g. on the command line).
///
/// `None` behaves like a user who closed the chooser.
#[derive(Debug, Clone, Default)]
pub struct LocalDocumentPicker {
    path: Option<PathBuf>,
}

impl LocalDocumentPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentPicker for LocalDocumentPicker {
    async fn pick(&self, accept: &[&str]) -> Result<PickOutcome, ImgTxtError> {
        let Some(path) = &self.path else {
            return Ok(PickOutcome::Cancelled);
        };
        let mime = mime_guess::from_path(path).first_raw();
        match mime {
            Some(m) if accepts(m, accept) => {}
            _ => {
                return Err(ImgTxtError::acquisition(format!(
                    "'{}' is not an image or PDF",
                    path.display()
                )))
            }
        }
        let uri = file_uri(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(PickOutcome::Picked(vec![PickedDocument {
            uri,
            name,
            mime_type: mime.map(str::to_string),
        }]))
    }
}

/// Camera that "captures" an existing image file.
#[derive(Debug, Clone)]
pub struct LocalCamera {
    image: Option<PathBuf>,
    permitted: bool,
}

impl LocalCamera {
    pub fn new(image: Option<PathBuf>) -> Self {
        Self {
            image,
            permitted: true,
        }
    }

    /// Simulate the user refusing camera access.
    pub fn denied() -> Self {
        Self {
            image: None,
            permitted: false,
        }
    }
}

#[async_trait]
impl CameraCapture for LocalCamera {
    async fn request_permission(&self) -> Result<PermissionStatus, ImgTxtError> {
        Ok(if self.permitted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn capture(&self) -> Result<CaptureOutcome, ImgTxtError> {
        match &self.image {
            Some(path) => Ok(CaptureOutcome::Captured {
                uri: file_uri(path).await?,
            }),
            None => Ok(CaptureOutcome::Cancelled),
        }
    }
}
