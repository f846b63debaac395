//! Xcode DerivedData fallback for bare iOS projects.
//!
//! Xcode writes build products to
//! `~/Library/Developer/Xcode/DerivedData/<Project>-<hash>/Build/Products`.
//! The project name comes from the `.xcodeproj` or `.xcworkspace` in `ios/`.

use super::detector::fresh_directory;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// DerivedData location relative to the home directory.
pub const DEFAULT_DERIVED_DATA_DIR: &str = "Library/Developer/Xcode/DerivedData";

const PROJECT_EXTENSIONS: &[&str] = &["xcodeproj", "xcworkspace"];

/// Name of the first Xcode project or workspace in `ios_dir`, by sorted file name.
pub fn xcode_project_name(ios_dir: &Path) -> Option<String> {
    let mut names: Vec<String> = std::fs::read_dir(ios_dir)
        .ok()?
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names.into_iter().find_map(|name| {
        let (stem, ext) = name.rsplit_once('.')?;
        (PROJECT_EXTENSIONS.contains(&ext) && !stem.is_empty())
            .then(|| stem.to_string())
    })
}

/// Freshest `Build/Products` directory for the project at `root`.
pub fn find_products(
    root: &Path,
    derived_data_dir: &Path,
    window: Duration,
) -> Option<(PathBuf, SystemTime)> {
    let project = xcode_project_name(&root.join("ios"))?;
    let entries = std::fs::read_dir(derived_data_dir).ok()?;

    let mut newest: Option<(PathBuf, SystemTime)> = None;
    for entry in entries.flatten() {
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(&project));
        if !matches {
            continue;
        }
        let products = entry.path().join("Build").join("Products");
        let Some(modified) = fresh_directory(&products, window) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(_, best)| modified > *best) {
            newest = Some((products, modified));
        }
    }

    if newest.is_none() {
        debug!(
            project = %project,
            dir = %derived_data_dir.display(),
            "No fresh DerivedData products"
        );
    }
    newest
}
