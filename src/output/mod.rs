//! Build-artifact detection and output directory resolution.
//!
//! Resolution cascade, first match wins:
//! 1. **Caller override** - `--output-dir`, made absolute against the project root
//! 2. **Detection** - fresh React Native build output for the platform
//! 3. **Default** - `<root>/dota/bundles/<platform>`
//!
//! Detection classifies the project as Expo or bare, walks the platform's
//! candidate directories (Expo locations first), and accepts a directory that
//! is recent enough and holds bundle output. Bare iOS projects additionally
//! fall back to Xcode's DerivedData.

mod candidates;
mod derived_data;
mod detector;
mod platform;
mod project;
mod resolver;
mod types;

pub use candidates::{
    ANDROID_CANDIDATES, DEFAULT_ANDROID_VARIANTS, DetectionCandidate, EXPO_ANDROID_CANDIDATES,
    EXPO_IOS_CANDIDATES, IOS_CANDIDATES, Toolchain, base_candidates, expand_candidates,
    matches_bundle_signature,
};
pub use derived_data::{DEFAULT_DERIVED_DATA_DIR, find_products, xcode_project_name};
pub use detector::{ArtifactDetector, DEFAULT_FRESHNESS_WINDOW, DetectionSettings};
pub use platform::Platform;
pub use project::{EXPO_CONFIG_FILES, EXPO_DEPENDENCY_NAMES, PackageManifest, detect_project_type};
pub use resolver::{
    DEFAULT_OUTPUT_DIR, OutputPathOptions, default_output_dir, format_detection_message,
    is_same_path, resolve_output_path, resolve_output_path_with, standardized_output_path,
};
pub use types::{DetectionResult, DetectionSource, ProjectInfo};
