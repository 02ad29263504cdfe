//! Platform-dependent artifact URI handling.
//!
//! iOS pickers hand back `file://` URIs, but the multipart file part must
//! carry the bare path there or the service receives an unreadable file.
//! Every other platform passes the URI through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FILE_SCHEME_PREFIX: &str = "file://";

/// Host platform the artifact URI came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    #[default]
    Other,
}

impl Platform {
    /// Platform of the compile target.
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Other => "other",
        })
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            "other" => Ok(Platform::Other),
            other => Err(format!("unknown platform '{other}' (expected ios, android or other)")),
        }
    }
}

/// Rewrite an artifact URI into the form the upload part needs on `platform`.
pub fn normalize_artifact_uri(uri: &str, platform: Platform) -> String {
    match platform {
        Platform::Ios => uri.strip_prefix(FILE_SCHEME_PREFIX).unwrap_or(uri).to_string(),
        Platform::Android | Platform::Other => uri.to_string(),
    }
}
