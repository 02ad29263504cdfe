//! Error types for the imgtxt library.
//!
//! Every error is non-fatal to a [`crate::screen::ConversionScreen`] session:
//! the screen turns each one into a [`crate::notice::Notice`] and leaves the
//! selection intact, so the user can simply retry the action.
//!
//! The first four variants are the user-facing kinds (nothing selected,
//! camera refused, picker failed, upload failed). The rest are raised by
//! configuration, the re-entrancy guard and the CLI's output helpers.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the imgtxt library.
#[derive(Debug, Error)]
pub enum ImgTxtError {
    // ── User-facing kinds ─────────────────────────────────────────────────
    /// Upload was triggered before any artifact was acquired.
    #[error("No file selected.\nPick a file or capture an image first.")]
    NoFileSelected,

    /// Camera authorisation was refused.
    #[error("Camera permission denied.\nCamera access is required to capture an image.")]
    PermissionDenied,

    /// The document picker or the camera failed.
    #[error("Could not acquire a file: {reason}")]
    AcquisitionFailed { reason: String },

    /// Transport error or non-2xx reply from the conversion service.
    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    // ── Guard ─────────────────────────────────────────────────────────────
    /// A previous upload has not resolved yet.
    #[error("An upload is already in progress; wait for it to finish.")]
    UploadInProgress,

    // ── Download ──────────────────────────────────────────────────────────
    /// The generated output file could not be fetched.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The conversion service base URL is unusable.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImgTxtError {
    /// Shorthand for [`ImgTxtError::UploadFailed`].
    pub fn upload(reason: impl Into<String>) -> Self {
        Self::UploadFailed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ImgTxtError::AcquisitionFailed`].
    pub fn acquisition(reason: impl Into<String>) -> Self {
        Self::AcquisitionFailed {
            reason: reason.into(),
        }
    }
}
