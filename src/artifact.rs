//! Data model shared by every stage: the input artifact, the two closed
//! option sets sent to the service, and the conversion result.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME type used when an artifact carries none.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A file chosen by the user or captured by the camera.
///
/// Immutable once created: a new acquisition yields a new artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputArtifact {
    uri: String,
    name: String,
    mime_type: String,
}

impl InputArtifact {
    pub fn new(uri: impl Into<String>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Local resource locator (plain path or `file://` URI).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type; may be empty when the picker did not report one.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// MIME type to put on the upload part.
    pub fn effective_mime_type(&self) -> &str {
        if self.mime_type.is_empty() {
            FALLBACK_MIME_TYPE
        } else {
            &self.mime_type
        }
    }
}

/// Error returned when a language or format code is not in its closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: String,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code '{}'", self.kind, self.code)
    }
}

impl std::error::Error for UnknownCode {}

/// Language hint sent to the conversion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionLanguage {
    #[default]
    Eng,
    Fra,
    Deu,
    Ara,
    Hin,
}

impl RecognitionLanguage {
    pub const ALL: [RecognitionLanguage; 5] = [
        RecognitionLanguage::Eng,
        RecognitionLanguage::Fra,
        RecognitionLanguage::Deu,
        RecognitionLanguage::Ara,
        RecognitionLanguage::Hin,
    ];

    /// Wire code placed in the `language` form field.
    pub fn code(self) -> &'static str {
        match self {
            RecognitionLanguage::Eng => "eng",
            RecognitionLanguage::Fra => "fra",
            RecognitionLanguage::Deu => "deu",
            RecognitionLanguage::Ara => "ara",
            RecognitionLanguage::Hin => "hin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecognitionLanguage::Eng => "English",
            RecognitionLanguage::Fra => "French",
            RecognitionLanguage::Deu => "German",
            RecognitionLanguage::Ara => "Arabic",
            RecognitionLanguage::Hin => "Hindi",
        }
    }
}

impl fmt::Display for RecognitionLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RecognitionLanguage {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.code() == s.trim())
            .ok_or_else(|| UnknownCode {
                kind: "language",
                code: s.to_string(),
            })
    }
}

/// Output document format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Docx,
    Txt,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Docx, OutputFormat::Txt];

    /// Wire code placed in the `format` form field.
    pub fn code(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Txt => "txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Docx => "Word (.docx)",
            OutputFormat::Txt => "Text (.txt)",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == s.trim())
            .ok_or_else(|| UnknownCode {
                kind: "format",
                code: s.to_string(),
            })
    }
}

/// Outcome of one successful upload.
///
/// Always replaces the previous result as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Recognised text; empty when the service returned none.
    pub recognized_text: String,
    /// Public download endpoint derived from the service's `download_url`.
    pub download_url: Option<String>,
}
