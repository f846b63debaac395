//! Output directory resolution: caller override, then detection, then default.

use super::detector::{ArtifactDetector, DetectionSettings};
use super::platform::Platform;
use super::project::detect_project_type;
use super::types::{DetectionResult, DetectionSource};
use crate::error::{ResolveError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Bundle directory relative to the project root. Not dot-prefixed so it shows
/// up in ordinary listings.
pub const DEFAULT_OUTPUT_DIR: &str = "dota/bundles";

#[derive(Debug, Clone)]
pub struct OutputPathOptions {
    /// Directory named by the caller; skips detection entirely
    pub user_output_dir: Option<PathBuf>,
    pub platform: Platform,
    /// Defaults to the current directory. A relative root is made absolute
    /// against the current directory.
    pub project_root: Option<PathBuf>,
    /// Report each step at info level
    pub verbose: bool,
    /// Pick the newest passing candidate instead of the first
    pub most_recent: bool,
}

impl OutputPathOptions {
    pub fn new(platform: Platform) -> Self {
        Self {
            user_output_dir: None,
            platform,
            project_root: None,
            verbose: false,
            most_recent: false,
        }
    }

    fn project_root(&self) -> Result<PathBuf> {
        match &self.project_root {
            Some(root) => std::path::absolute(root).map_err(ResolveError::ProjectRoot),
            None => std::env::current_dir().map_err(ResolveError::ProjectRoot),
        }
    }
}

/// `<root>/dota/bundles`
pub fn default_output_dir(root: &Path) -> PathBuf {
    root.join(DEFAULT_OUTPUT_DIR)
}

/// `<root>/dota/bundles/<platform>`, where bundles are always collected.
pub fn standardized_output_path(platform: Platform, root: &Path) -> PathBuf {
    default_output_dir(root).join(platform.as_str())
}

/// Resolve with default detection settings.
pub fn resolve_output_path(options: &OutputPathOptions) -> Result<DetectionResult> {
    resolve_output_path_with(options, &DetectionSettings::default())
}

/// Resolve the directory bundles for `options.platform` should come from.
///
/// The returned path is always absolute. Fails only when the current
/// directory is needed and unavailable. Performs no writes.
pub fn resolve_output_path_with(
    options: &OutputPathOptions,
    settings: &DetectionSettings,
) -> Result<DetectionResult> {
    let root = options.project_root()?;

    if let Some(dir) = &options.user_output_dir {
        let path = if dir.is_absolute() {
            dir.clone()
        } else {
            root.join(dir)
        };
        debug!(path = %path.display(), "Using caller-provided output directory");
        return Ok(DetectionResult::undetected(
            path,
            "User-provided output directory",
            DetectionSource::UserProvided,
        ));
    }

    let project = detect_project_type(&root);
    let kind = if project.is_expo {
        "Expo"
    } else {
        "Standard React Native"
    };
    if options.verbose {
        info!("Project type: {kind}");
        info!("Searching for {} build output...", options.platform);
    } else {
        debug!(project_type = kind, platform = %options.platform, "Searching for build output");
    }

    let detector = ArtifactDetector::new(options.platform, settings.clone());
    let detected = if options.most_recent {
        detector.most_recent(&root, project.is_expo)
    } else {
        detector.detect(&root, project.is_expo)
    };

    match detected {
        Some(result) => {
            if options.verbose {
                info!("Detected: {}", result.description);
                info!("Path: {}", result.path.display());
            }
            Ok(result)
        }
        None => {
            if options.verbose {
                info!("No build output detected, using default");
            }
            Ok(DetectionResult::undetected(
                standardized_output_path(options.platform, &root),
                "Default visible directory",
                DetectionSource::DefaultFallback,
            ))
        }
    }
}

/// Two-line summary of where bundles will come from.
pub fn format_detection_message(result: &DetectionResult) -> String {
    let (emoji, status) = if result.detected {
        ("🔍", "Detected")
    } else {
        ("📦", "Using")
    };
    format!(
        "{emoji} {status}: {}\n   Path: {}",
        result.description,
        result.path.display()
    )
}

/// Whether two paths name the same location once made absolute and normalized.
///
/// Purely lexical: symlinks are not followed and neither path needs to exist.
pub fn is_same_path(a: &Path, b: &Path) -> bool {
    match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn normalize(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Some(normalized)
}
