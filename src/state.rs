//! Selection state of a conversion screen.
//!
//! [`SelectionState`] is an immutable snapshot. Each user event goes through
//! one transition function that returns the next snapshot, which keeps the
//! whole lifecycle testable without any rendering layer:
//!
//! ```text
//!          acquire            submit              succeed
//! Empty ──────────▶ Selected ───────▶ Submitting ─────────▶ Resulted
//!                     ▲   ▲              │                     │
//!                     │   └──── fail ────┘                     │
//!                     └──────────────── acquire ───────────────┘
//! ```
//!
//! While `Submitting`, both `submit` and `acquire` are refused with
//! [`ImgTxtError::UploadInProgress`]; a second upload must wait for the first.

use crate::artifact::{ConversionResult, InputArtifact, OutputFormat, RecognitionLanguage};
use crate::error::ImgTxtError;
use serde::Serialize;

/// Where the current artifact is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Empty,
    Selected,
    Submitting,
    Resulted,
}

/// Everything the screen knows between user events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    artifact: Option<InputArtifact>,
    language: RecognitionLanguage,
    format: OutputFormat,
    result: Option<ConversionResult>,
    phase: Phase,
}

/// The values captured when an upload starts.
///
/// Later language/format changes do not affect an upload already in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub artifact: InputArtifact,
    pub language: RecognitionLanguage,
    pub format: OutputFormat,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(RecognitionLanguage::default(), OutputFormat::default())
    }
}

impl SelectionState {
    pub fn new(language: RecognitionLanguage, format: OutputFormat) -> Self {
        Self {
            artifact: None,
            language,
            format,
            result: None,
            phase: Phase::Empty,
        }
    }

    pub fn artifact(&self) -> Option<&InputArtifact> {
        self.artifact.as_ref()
    }

    pub fn language(&self) -> RecognitionLanguage {
        self.language
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Adopt a newly acquired artifact, clearing any previous result.
    pub fn acquire(&self, artifact: InputArtifact) -> Result<Self, ImgTxtError> {
        if self.is_submitting() {
            return Err(ImgTxtError::UploadInProgress);
        }
        Ok(Self {
            artifact: Some(artifact),
            result: None,
            phase: Phase::Selected,
            ..self.clone()
        })
    }

    pub fn with_language(&self, language: RecognitionLanguage) -> Self {
        Self {
            language,
            ..self.clone()
        }
    }

    pub fn with_format(&self, format: OutputFormat) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    /// Enter `Submitting` and capture what should be uploaded.
    pub fn submit(&self) -> Result<(Self, Submission), ImgTxtError> {
        if self.is_submitting() {
            return Err(ImgTxtError::UploadInProgress);
        }
        let artifact = self.artifact.clone().ok_or(ImgTxtError::NoFileSelected)?;
        let submission = Submission {
            artifact,
            language: self.language,
            format: self.format,
        };
        let next = Self {
            phase: Phase::Submitting,
            ..self.clone()
        };
        Ok((next, submission))
    }

    /// Record a successful upload. The new result replaces the old one.
    ///
    /// Outside `Submitting` this is a stale completion and changes nothing.
    pub fn succeed(&self, result: ConversionResult) -> Self {
        if !self.is_submitting() {
            return self.clone();
        }
        Self {
            result: Some(result),
            phase: Phase::Resulted,
            ..self.clone()
        }
    }

    /// Record a failed upload; any previous result stays visible.
    pub fn fail(&self) -> Self {
        if !self.is_submitting() {
            return self.clone();
        }
        Self {
            phase: Phase::Selected,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan() -> InputArtifact {
        InputArtifact::new("/tmp/scan.png", "scan.png", "image/png")
    }

    fn result(text: &str) -> ConversionResult {
        ConversionResult {
            recognized_text: text.into(),
            download_url: Some("https://host/download/out.docx".into()),
        }
    }

    #[test]
    fn starts_empty_with_defaults() {
        let s = SelectionState::default();
        assert_eq!(s.phase(), Phase::Empty);
        assert!(s.artifact().is_none());
        assert!(s.result().is_none());
        assert_eq!(s.language(), RecognitionLanguage::Eng);
        assert_eq!(s.format(), OutputFormat::Docx);
    }

    #[test]
    fn submit_without_artifact_is_refused() {
        let s = SelectionState::default();
        assert!(matches!(s.submit(), Err(ImgTxtError::NoFileSelected)));
        assert_eq!(s.phase(), Phase::Empty);
    }

    #[test]
    fn full_lifecycle() {
        let s = SelectionState::default().acquire(scan()).unwrap();
        assert_eq!(s.phase(), Phase::Selected);

        let s = s.with_language(RecognitionLanguage::Deu).with_format(OutputFormat::Txt);
        let (s, sub) = s.submit().unwrap();
        assert_eq!(s.phase(), Phase::Submitting);
        assert_eq!(sub.artifact, scan());
        assert_eq!(sub.language, RecognitionLanguage::Deu);
        assert_eq!(sub.format, OutputFormat::Txt);

        let s = s.succeed(result("hello"));
        assert_eq!(s.phase(), Phase::Resulted);
        assert_eq!(s.result().unwrap().recognized_text, "hello");
    }

    #[test]
    fn second_submit_is_refused_while_submitting() {
        let (s, _) = SelectionState::default().acquire(scan()).unwrap().submit().unwrap();
        assert!(matches!(s.submit(), Err(ImgTxtError::UploadInProgress)));
        assert!(matches!(s.acquire(scan()), Err(ImgTxtError::UploadInProgress)));
    }

    #[test]
    fn failure_keeps_previous_result() {
        let (s, _) = SelectionState::default().acquire(scan()).unwrap().submit().unwrap();
        let s = s.succeed(result("first"));
        let (s, _) = s.submit().unwrap();
        let s = s.fail();
        assert_eq!(s.phase(), Phase::Selected);
        assert_eq!(s.result().unwrap().recognized_text, "first");
        assert!(s.artifact().is_some());
    }

    #[test]
    fn reacquire_clears_result() {
        let (s, _) = SelectionState::default().acquire(scan()).unwrap().submit().unwrap();
        let s = s.succeed(result("first"));
        let other = InputArtifact::new("/tmp/b.pdf", "b.pdf", "application/pdf");
        let s = s.acquire(other.clone()).unwrap();
        assert_eq!(s.phase(), Phase::Selected);
        assert!(s.result().is_none());
        assert_eq!(s.artifact(), Some(&other));
    }

    #[test]
    fn success_replaces_instead_of_merging() {
        let (s, _) = SelectionState::default().acquire(scan()).unwrap().submit().unwrap();
        let s = s.succeed(result("first"));
        let (s, _) = s.submit().unwrap();
        let s = s.succeed(ConversionResult::default());
        let r = s.result().unwrap();
        assert_eq!(r.recognized_text, "");
        assert_eq!(r.download_url, None);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let s = SelectionState::default().acquire(scan()).unwrap();
        assert_eq!(s.succeed(result("late")), s);
        assert_eq!(s.fail(), s);
    }

    #[test]
    fn language_change_keeps_phase_and_result() {
        let (s, _) = SelectionState::default().acquire(scan()).unwrap().submit().unwrap();
        let s = s.succeed(result("x")).with_language(RecognitionLanguage::Hin);
        assert_eq!(s.phase(), Phase::Resulted);
        assert!(s.result().is_some());
        assert_eq!(s.language(), RecognitionLanguage::Hin);
    }
}
