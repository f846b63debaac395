//! Configuration types: source tags, provenance, load results and the typed
//! settings view.

use super::tree::ConfigTree;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration source priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in defaults (lowest priority)
    Default = 0,
    /// `DELIVR_*` / `CODE_PUSH_*` environment variables
    Environment = 1,
    /// `~/.delivr/config.json` (or the legacy `~/.dota.config`)
    GlobalFile = 2,
    /// Project-local `.delivrrc` family (or a legacy project file)
    ProjectFile = 3,
    /// Caller-supplied overrides (highest priority)
    Cli = 4,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::GlobalFile => write!(f, "global file"),
            ConfigSource::ProjectFile => write!(f, "project file"),
            ConfigSource::Cli => write!(f, "cli"),
        }
    }
}

/// Dot-path of each resolved leaf mapped to the source that supplied it.
pub type ProvenanceMap = BTreeMap<String, ConfigSource>;

/// Outcome of a full resolution pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigLoadResult {
    /// Merged configuration tree
    pub config: ConfigTree,
    /// Which source supplied each leaf
    pub sources: ProvenanceMap,
    /// Project-local file that contributed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// True when no project-local file contributed
    pub used_empty_file: bool,
}

impl ConfigLoadResult {
    /// Deserialize the merged tree into the typed [`Settings`] view.
    pub fn settings(&self) -> Result<Settings, serde_json::Error> {
        Settings::from_tree(&self.config)
    }
}

/// Typed view over the resolved tree.
///
/// `release`, `build` and `distribution` are passed through untouched for the
/// release executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub defaults: DefaultsSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Value>,
}

impl Settings {
    pub fn from_tree(tree: &ConfigTree) -> Result<Self, serde_json::Error> {
        serde_json::from_value(tree.to_json())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Server URL, e.g. `https://api.delivr.com`
    pub url: Option<String>,
    /// API path prefix, e.g. `/api/v1`
    pub api_endpoint: Option<String>,
    /// Request timeout in milliseconds
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    pub access_key: Option<String>,
    pub preserve_on_logout: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsSettings {
    pub project: Option<String>,
    pub deployment_name: Option<String>,
    pub release_type: Option<String>,
    pub platforms: Option<Vec<String>>,
}

/// Built-in defaults, the lowest-priority source.
pub fn default_config() -> ConfigTree {
    let mut tree = ConfigTree::new();
    tree.set_path("server.url", Value::from("http://localhost:3000"));
    tree.set_path("server.apiEndpoint", Value::from("/api/v1"));
    tree.set_path("server.timeout", Value::from(30_000));
    tree.set_path("defaults.deploymentName", Value::from("Staging"));
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_ordering() {
        assert!(ConfigSource::Default < ConfigSource::Environment);
        assert!(ConfigSource::Environment < ConfigSource::GlobalFile);
        assert!(ConfigSource::GlobalFile < ConfigSource::ProjectFile);
        assert!(ConfigSource::ProjectFile < ConfigSource::Cli);
    }

    #[test]
    fn test_default_config_shape() {
        assert_eq!(
            default_config().to_json(),
            json!({
                "server": {
                    "url": "http://localhost:3000",
                    "apiEndpoint": "/api/v1",
                    "timeout": 30000
                },
                "defaults": {"deploymentName": "Staging"}
            })
        );
    }

    #[test]
    fn test_settings_view() {
        let tree = ConfigTree::from_json(json!({
            "server": {"url": "https://x.io", "timeout": 5000},
            "auth": {"accessKey": "k", "preserveOnLogout": true},
            "build": {"android": {"variant": "release"}}
        }))
        .unwrap();
        let settings = Settings::from_tree(&tree).unwrap();
        assert_eq!(settings.server.url.as_deref(), Some("https://x.io"));
        assert_eq!(settings.server.timeout, Some(5000));
        assert_eq!(settings.auth.preserve_on_logout, Some(true));
        assert_eq!(
            settings.build,
            Some(json!({"android": {"variant": "release"}}))
        );
        assert!(settings.release.is_none());
    }
}
