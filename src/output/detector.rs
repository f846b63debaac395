//! Build-artifact detection for one platform.

use super::candidates::{
    DEFAULT_ANDROID_VARIANTS, DetectionCandidate, base_candidates, expand_candidates,
    matches_bundle_signature,
};
use super::derived_data::{self, DEFAULT_DERIVED_DATA_DIR};
use super::platform::Platform;
use super::types::{DetectionResult, DetectionSource};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, trace};

/// Builds older than this are treated as stale.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Tunable heuristics for artifact detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionSettings {
    /// Maximum age of a candidate directory
    pub freshness_window: Duration,
    /// Android build variants substituted into each template
    pub android_variants: Vec<String>,
    /// Xcode DerivedData directory; `None` disables the iOS fallback
    pub derived_data_dir: Option<PathBuf>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            android_variants: DEFAULT_ANDROID_VARIANTS
                .iter()
                .map(|v| v.to_string())
                .collect(),
            derived_data_dir: dirs::home_dir()
                .map(|home| home.join(DEFAULT_DERIVED_DATA_DIR)),
        }
    }
}

impl DetectionSettings {
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_derived_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.derived_data_dir = dir;
        self
    }
}

/// Modification time of `path` if it is a directory modified within `window`.
pub(super) fn fresh_directory(path: &Path, window: Duration) -> Option<SystemTime> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_dir() {
        return None;
    }
    let modified = metadata.modified().ok()?;
    // A timestamp in the future counts as age zero.
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    if age > window {
        trace!(path = %path.display(), age_secs = age.as_secs(), "Skipping stale build directory");
        return None;
    }
    Some(modified)
}

fn has_bundle_files(platform: Platform, dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .any(|name| matches_bundle_signature(platform, &name))
}

/// Searches a project for fresh build output of one platform.
#[derive(Debug, Clone)]
pub struct ArtifactDetector {
    platform: Platform,
    settings: DetectionSettings,
}

impl ArtifactDetector {
    pub fn new(platform: Platform, settings: DetectionSettings) -> Self {
        Self { platform, settings }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// First candidate that passes every filter, in template order.
    ///
    /// For bare iOS projects the Xcode DerivedData directory is searched when
    /// no template matches.
    pub fn detect(&self, root: &Path, is_expo: bool) -> Option<DetectionResult> {
        for (_, relative) in self.candidates(is_expo) {
            let path = root.join(&relative);
            if let Some(modified) = self.check(&path) {
                debug!(path = %path.display(), "Found build output");
                return Some(self.detected(path, modified, is_expo, ""));
            }
        }

        let window = self.settings.freshness_window;
        if self.platform == Platform::Ios
            && !is_expo
            && let Some(dir) = &self.settings.derived_data_dir
            && let Some((path, modified)) = derived_data::find_products(root, dir, window)
        {
            debug!(path = %path.display(), "Found build output in DerivedData");
            return Some(DetectionResult {
                detected: true,
                path,
                description: "iOS build output (DerivedData)".to_string(),
                source: DetectionSource::IosBuild,
                modified_at: Some(DateTime::<Utc>::from(modified)),
            });
        }

        None
    }

    /// Newest candidate that passes every filter, regardless of template order.
    ///
    /// Ties keep the earlier candidate.
    pub fn most_recent(&self, root: &Path, is_expo: bool) -> Option<DetectionResult> {
        let mut newest: Option<(PathBuf, SystemTime)> = None;
        for (_, relative) in self.candidates(is_expo) {
            let path = root.join(&relative);
            let Some(modified) = self.check(&path) else {
                continue;
            };
            if newest.as_ref().is_none_or(|(_, best)| modified > *best) {
                newest = Some((path, modified));
            }
        }
        newest.map(|(path, modified)| self.detected(path, modified, is_expo, ", most recent"))
    }

    fn candidates(&self, is_expo: bool) -> Vec<(DetectionCandidate, String)> {
        let base = base_candidates(self.platform, is_expo);
        expand_candidates(&base, &self.settings.android_variants)
    }

    fn check(&self, path: &Path) -> Option<SystemTime> {
        let modified = fresh_directory(path, self.settings.freshness_window)?;
        has_bundle_files(self.platform, path).then_some(modified)
    }

    fn detected(
        &self,
        path: PathBuf,
        modified: SystemTime,
        is_expo: bool,
        suffix: &str,
    ) -> DetectionResult {
        let (source, flavor) = match (is_expo, self.platform) {
            (true, _) => (DetectionSource::ExpoBuild, "Expo"),
            (false, Platform::Android) => (DetectionSource::AndroidBuild, "standard"),
            (false, Platform::Ios) => (DetectionSource::IosBuild, "standard"),
        };
        DetectionResult {
            detected: true,
            path,
            description: format!(
                "{} build output ({flavor}{suffix})",
                self.platform.display_name()
            ),
            source,
            modified_at: Some(DateTime::<Utc>::from(modified)),
        }
    }
}
