//! React Native project classification (Expo or bare).

use super::types::ProjectInfo;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Files whose presence at the project root marks an Expo project.
pub const EXPO_CONFIG_FILES: &[&str] = &["app.json", "app.config.js", "app.config.ts"];

/// Dependencies that mark an Expo project.
pub const EXPO_DEPENDENCY_NAMES: &[&str] = &["expo", "expo-cli"];

pub const PACKAGE_JSON_FILE: &str = "package.json";
pub const REACT_NATIVE_DEPENDENCY: &str = "react-native";

/// The parts of `package.json` that classification reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub dependencies: Map<String, Value>,
    #[serde(default)]
    pub dev_dependencies: Map<String, Value>,
}

impl PackageManifest {
    /// Read `package.json` from `root`. Missing or unparseable manifests yield `None`.
    pub fn read(root: &Path) -> Option<Self> {
        let path = root.join(PACKAGE_JSON_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Ignoring unparseable package.json");
                None
            }
        }
    }

    /// Look up a dependency across both maps; `devDependencies` shadow `dependencies`.
    pub fn dependency(&self, name: &str) -> Option<&Value> {
        self.dev_dependencies
            .get(name)
            .or_else(|| self.dependencies.get(name))
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependency(name).is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn has_expo_config(root: &Path) -> bool {
    EXPO_CONFIG_FILES
        .iter()
        .any(|name| root.join(name).exists())
}

/// Classify the project at `root`.
///
/// Either signal is enough: an Expo config file at the root, or an Expo
/// dependency in `package.json`. Never fails.
pub fn detect_project_type(root: &Path) -> ProjectInfo {
    let manifest = PackageManifest::read(root);
    let has_expo_dependency = manifest
        .as_ref()
        .is_some_and(|m| EXPO_DEPENDENCY_NAMES.iter().any(|n| m.has_dependency(n)));
    let react_native_version = manifest
        .as_ref()
        .and_then(|m| m.dependency(REACT_NATIVE_DEPENDENCY))
        .and_then(Value::as_str)
        .map(str::to_string);

    ProjectInfo {
        is_expo: has_expo_config(root) || has_expo_dependency,
        project_root: root.to_path_buf(),
        react_native_version,
    }
}
