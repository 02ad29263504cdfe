//! Blocking user-visible notices.
//!
//! Every outcome a user must acknowledge (success, each error kind) is
//! reported as a [`Notice`] through an injected [`NoticeSink`]. A mobile
//! shell would show an alert dialog; the CLI prints to stderr; tests record.
//!
//! # Example
//!
//! ```rust
//! use imgtxt::{Notice, NoticeSink};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<Notice>>);
//!
//! impl NoticeSink for Recorder {
//!     fn notify(&self, notice: &Notice) {
//!         self.0.lock().unwrap().push(notice.clone());
//!     }
//! }
//!
//! let rec = Recorder::default();
//! rec.notify(&Notice::success());
//! assert_eq!(rec.0.lock().unwrap()[0].title, "Success");
//! ```

use crate::error::ImgTxtError;
use serde::Serialize;
use std::sync::Arc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A titled message the user has to dismiss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn error(title: &str, message: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Shown whenever an upload completes without transport or server error.
    pub fn success() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".into(),
            message: "File processed successfully!".into(),
        }
    }

    pub fn no_file_selected() -> Self {
        Self::error("No file selected", "Please select a file first.")
    }

    pub fn permission_denied() -> Self {
        Self::error("Permission Denied", "Camera access is required.")
    }

    pub fn pick_failed() -> Self {
        Self::error("Error", "Could not pick file.")
    }

    pub fn capture_failed() -> Self {
        Self::error("Error", "Could not capture image.")
    }

    pub fn upload_failed() -> Self {
        Self::error("Upload Failed", "Could not upload the file.")
    }

    pub fn upload_in_progress() -> Self {
        Self::error("Please wait", "An upload is already in progress.")
    }

    /// Generic fallback for errors without a dedicated notice.
    pub fn from_error(err: &ImgTxtError) -> Self {
        match err {
            ImgTxtError::NoFileSelected => Self::no_file_selected(),
            ImgTxtError::PermissionDenied => Self::permission_denied(),
            ImgTxtError::AcquisitionFailed { .. } => Self::pick_failed(),
            ImgTxtError::UploadFailed { .. } => Self::upload_failed(),
            ImgTxtError::UploadInProgress => Self::upload_in_progress(),
            other => Self {
                kind: NoticeKind::Error,
                title: "Error".into(),
                message: other.to_string(),
            },
        }
    }
}

/// Receives notices from a [`crate::screen::ConversionScreen`].
///
/// Must be `Send + Sync`: the screen is shared across tasks.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Discards every notice. Default when no sink is configured.
pub struct NoopNoticeSink;

impl NoticeSink for NoopNoticeSink {
    fn notify(&self, _notice: &Notice) {}
}

/// Convenience alias for the type a screen stores.
pub type SharedNoticeSink = Arc<dyn NoticeSink>;
