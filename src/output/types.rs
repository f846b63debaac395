//! Detection outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a resolved output path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// Standard Android Gradle build output
    AndroidBuild,
    /// Standard Xcode build output (project tree or DerivedData)
    IosBuild,
    /// Build output of an Expo project
    ExpoBuild,
    /// Directory named by the caller
    UserProvided,
    /// Nothing detected; the default bundle directory
    DefaultFallback,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::AndroidBuild => "android_build",
            DetectionSource::IosBuild => "ios_build",
            DetectionSource::ExpoBuild => "expo_build",
            DetectionSource::UserProvided => "user_provided",
            DetectionSource::DefaultFallback => "default_fallback",
        }
    }
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved output directory and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// True only when a build artifact directory was found on disk
    pub detected: bool,
    pub path: PathBuf,
    pub description: String,
    pub source: DetectionSource,
    /// Modification time of a detected directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl DetectionResult {
    /// A result for a path that was not found by detection.
    pub fn undetected(
        path: PathBuf,
        description: impl Into<String>,
        source: DetectionSource,
    ) -> Self {
        Self {
            detected: false,
            path,
            description: description.into(),
            source,
            modified_at: None,
        }
    }
}

/// Classification of a React Native project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub is_expo: bool,
    pub project_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react_native_version: Option<String>,
}
