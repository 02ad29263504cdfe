//! # imgtxt
//!
//! Client for an image-to-text conversion service: pick a file or capture an
//! image, choose a recognition language and output format, upload, and get
//! back the recognised text plus a link to the generated document.
//!
//! All recognition and conversion happens on the service. This crate owns
//! the contract around it: the selection state machine, the multipart upload,
//! and how the reply is turned into something to show.
//!
//! ## Flow
//!
//! ```text
//! pick_file / capture_from_camera      (acquire)
//!  │
//!  ├─ SelectionState::acquire          (state: result cleared)
//!  ├─ set_language / set_format
//!  ├─ upload                           (state: Submitting, re-entry refused)
//!  │    └─ POST {base_url}/api/upload  (upload: multipart file/language/format)
//!  └─ ResultView                       (presenter: text + /download/<file>)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgtxt::{ClientConfig, ConversionScreen, HttpConversionService, LocalDocumentPicker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default();
//!     let service = Arc::new(HttpConversionService::new(config.clone())?);
//!     let screen = ConversionScreen::new(config, service)
//!         .with_picker(Arc::new(LocalDocumentPicker::new(Some("scan.png".into()))));
//!
//!     screen.pick_file().await?;
//!     let result = screen.upload().await?;
//!     println!("{}", result.recognized_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `imgtxt` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod acquire;
pub mod artifact;
pub mod config;
pub mod error;
pub mod notice;
pub mod output;
pub mod platform;
pub mod presenter;
pub mod screen;
pub mod state;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use acquire::{
    CameraCapture, CaptureOutcome, DocumentPicker, LocalCamera, LocalDocumentPicker,
    PermissionStatus, PickOutcome, PickedDocument,
};
pub use artifact::{ConversionResult, InputArtifact, OutputFormat, RecognitionLanguage};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::ImgTxtError;
pub use notice::{NoopNoticeSink, Notice, NoticeKind, NoticeSink};
pub use platform::{normalize_artifact_uri, Platform};
pub use presenter::{activate_download, ResultView, UrlOpener};
pub use screen::ConversionScreen;
pub use state::{Phase, SelectionState, Submission};
pub use upload::{
    convert, ConversionService, HttpConversionService, UploadRequest, UploadResponse,
};
