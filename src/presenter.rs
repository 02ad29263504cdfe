//! Result presenter: what the result area should show for a given state.
//!
//! The two sections are independent. The text section holds the recognised
//! text (editable on screen, never sent back); the download section holds
//! the derived link, which is activated through a [`UrlOpener`].

use crate::error::ImgTxtError;
use crate::state::{Phase, SelectionState};
use async_trait::async_trait;
use serde::Serialize;

/// Projection of a [`SelectionState`] for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// Name of the selected artifact, if any.
    pub selected: Option<String>,
    /// Recognised text; `None` suppresses the section.
    pub text: Option<String>,
    /// Download link; `None` suppresses the section.
    pub download_url: Option<String>,
    /// True while an upload is in flight (trigger disabled).
    pub busy: bool,
}

impl ResultView {
    pub fn from_state(state: &SelectionState) -> Self {
        let result = state.result();
        Self {
            selected: state.artifact().map(|a| a.name().to_string()),
            text: result
                .map(|r| r.recognized_text.clone())
                .filter(|t| !t.is_empty()),
            download_url: result.and_then(|r| r.download_url.clone()),
            busy: state.phase() == Phase::Submitting,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_none() && self.download_url.is_none()
    }
}

/// Hands a URL to whatever the host uses to open links.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), ImgTxtError>;
}

/// Activate the download link of `view`, if it has one.
///
/// Returns whether a link was opened.
pub async fn activate_download(view: &ResultView, opener: &dyn UrlOpener) -> Result<bool, ImgTxtError> {
    match &view.download_url {
        Some(url) => {
            opener.open(url).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
