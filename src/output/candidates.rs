//! Candidate build-output locations and bundle signatures.

use super::platform::Platform;

/// Build layer that produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolchain {
    Standard,
    Expo,
}

/// One place a build artifact might live, relative to the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionCandidate {
    pub platform: Platform,
    pub toolchain: Toolchain,
    pub template: &'static str,
}

const fn android(template: &'static str) -> DetectionCandidate {
    DetectionCandidate {
        platform: Platform::Android,
        toolchain: Toolchain::Standard,
        template,
    }
}

const fn ios(template: &'static str) -> DetectionCandidate {
    DetectionCandidate {
        platform: Platform::Ios,
        toolchain: Toolchain::Standard,
        template,
    }
}

const fn expo(platform: Platform, template: &'static str) -> DetectionCandidate {
    DetectionCandidate {
        platform,
        toolchain: Toolchain::Expo,
        template,
    }
}

pub const ANDROID_CANDIDATES: &[DetectionCandidate] = &[
    android("android/app/build/generated/assets/react/release"),
    android("android/app/build/generated/assets/react/debug"),
    android("android/app/build/intermediates/assets/release"),
    android("android/app/build/intermediates/assets/debug"),
    android("android/app/build/generated/res/react/release"),
    android("android/app/build/generated/res/react/debug"),
];

pub const EXPO_ANDROID_CANDIDATES: &[DetectionCandidate] = &[
    expo(
        Platform::Android,
        ".expo/android/app/build/generated/assets/react/release",
    ),
    expo(
        Platform::Android,
        ".expo/android/app/build/generated/assets/react/debug",
    ),
];

pub const IOS_CANDIDATES: &[DetectionCandidate] = &[
    ios("ios/build/Build/Products/Release-iphonesimulator"),
    ios("ios/build/Build/Products/Debug-iphonesimulator"),
    ios("ios/build/Build/Products/Release-iphoneos"),
    ios("ios/build/Build/Products/Debug-iphoneos"),
    ios("ios/build"),
];

pub const EXPO_IOS_CANDIDATES: &[DetectionCandidate] = &[expo(Platform::Ios, ".expo/ios/build")];

/// Android Gradle build variants tried for each Android template.
pub const DEFAULT_ANDROID_VARIANTS: &[&str] = &["release", "debug", "staging"];

/// Templates for `platform`, Expo locations first when `is_expo`.
pub fn base_candidates(platform: Platform, is_expo: bool) -> Vec<DetectionCandidate> {
    let (expo, standard) = match platform {
        Platform::Android => (EXPO_ANDROID_CANDIDATES, ANDROID_CANDIDATES),
        Platform::Ios => (EXPO_IOS_CANDIDATES, IOS_CANDIDATES),
    };
    let mut candidates = Vec::with_capacity(expo.len() + standard.len());
    if is_expo {
        candidates.extend_from_slice(expo);
    }
    candidates.extend_from_slice(standard);
    candidates
}

/// Substitute `variant` for a trailing `release` or `debug` segment.
///
/// Templates without such a segment are returned unchanged.
pub fn with_variant(template: &str, variant: &str) -> String {
    match template.rsplit_once('/') {
        Some((parent, "release" | "debug")) => format!("{parent}/{variant}"),
        _ => template.to_string(),
    }
}

/// Relative paths to probe, in order, each tagged with its candidate.
///
/// Android templates expand to the template itself followed by one path per
/// build variant. A path is visited once even when several templates produce it.
pub fn expand_candidates(
    candidates: &[DetectionCandidate],
    variants: &[String],
) -> Vec<(DetectionCandidate, String)> {
    let mut expanded: Vec<(DetectionCandidate, String)> = Vec::new();
    let mut push = |candidate: DetectionCandidate, path: String| {
        if !expanded.iter().any(|(_, seen)| *seen == path) {
            expanded.push((candidate, path));
        }
    };
    for candidate in candidates {
        push(*candidate, candidate.template.to_string());
        if candidate.platform == Platform::Android {
            for variant in variants {
                push(*candidate, with_variant(candidate.template, variant));
            }
        }
    }
    expanded
}

/// Whether a directory entry name looks like bundle output for `platform`.
pub fn matches_bundle_signature(platform: Platform, name: &str) -> bool {
    match platform {
        Platform::Android => {
            name.contains(".bundle")
                || name.contains("index.android")
                || name == "assets"
                || name == "res"
        }
        Platform::Ios => {
            name.ends_with(".app")
                || name.contains(".jsbundle")
                || name.contains("main.")
                || name == "assets"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants() -> Vec<String> {
        DEFAULT_ANDROID_VARIANTS
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_expo_templates_come_first() {
        let candidates = base_candidates(Platform::Ios, true);
        assert_eq!(candidates[0].template, ".expo/ios/build");
        assert_eq!(candidates.len(), IOS_CANDIDATES.len() + 1);
        assert_eq!(base_candidates(Platform::Ios, false), IOS_CANDIDATES);
    }

    #[test]
    fn test_with_variant() {
        assert_eq!(
            with_variant("android/app/build/intermediates/assets/debug", "staging"),
            "android/app/build/intermediates/assets/staging"
        );
        assert_eq!(with_variant("ios/build", "staging"), "ios/build");
    }

    #[test]
    fn test_android_expansion_order_and_dedup() {
        let expanded = expand_candidates(&ANDROID_CANDIDATES[..2], &variants());
        let paths: Vec<&str> = expanded.iter().map(|(_, p)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "android/app/build/generated/assets/react/release",
                "android/app/build/generated/assets/react/debug",
                "android/app/build/generated/assets/react/staging",
            ]
        );
    }

    #[test]
    fn test_ios_not_expanded() {
        let expanded = expand_candidates(IOS_CANDIDATES, &variants());
        assert_eq!(expanded.len(), IOS_CANDIDATES.len());
    }

    #[test]
    fn test_bundle_signatures() {
        assert!(matches_bundle_signature(Platform::Android, "index.android.bundle"));
        assert!(matches_bundle_signature(Platform::Android, "res"));
        assert!(!matches_bundle_signature(Platform::Android, "main.jsbundle"));
        assert!(!matches_bundle_signature(Platform::Android, "build.gradle"));
        assert!(matches_bundle_signature(Platform::Ios, "MyApp.app"));
        assert!(matches_bundle_signature(Platform::Ios, "main.jsbundle"));
        assert!(!matches_bundle_signature(Platform::Ios, "res"));
    }
}
