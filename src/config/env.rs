//! Environment-variable source.
//!
//! The variable table is data only: each row names a variable, the dot-path it
//! fills, and an [`EnvTransform`] tag applied to the raw string.

use super::tree::ConfigTree;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

pub const SERVER_URL: &str = "DELIVR_SERVER_URL";
pub const ACCESS_KEY: &str = "DELIVR_ACCESS_KEY";
pub const PROJECT: &str = "DELIVR_PROJECT";
pub const DEPLOYMENT_NAME: &str = "DELIVR_DEPLOYMENT_NAME";
pub const API_ENDPOINT: &str = "DELIVR_API_ENDPOINT";
pub const TIMEOUT: &str = "DELIVR_TIMEOUT";

/// Explicit config file, bypassing the project search.
pub const CONFIG_PATH: &str = "DELIVR_CONFIG_PATH";

/// Set to `true` to ignore every config file.
pub const NO_CONFIG: &str = "DELIVR_NO_CONFIG";

/// CodePush-era names, still honoured.
pub const LEGACY_SERVER_URL: &str = "CODE_PUSH_SERVER_URL";
pub const LEGACY_ACCESS_KEY: &str = "CODE_PUSH_ACCESS_KEY";

/// How a raw variable value becomes a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvTransform {
    /// Keep the string as-is.
    Identity,
    /// Parse a base-10 integer. Unparseable values are skipped.
    ParseInteger,
}

impl EnvTransform {
    pub fn apply(self, raw: &str) -> Option<Value> {
        match self {
            EnvTransform::Identity => Some(Value::String(raw.to_string())),
            EnvTransform::ParseInteger => raw.trim().parse::<i64>().ok().map(Value::from),
        }
    }
}

/// One row of the environment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvMapping {
    pub var: &'static str,
    pub path: &'static str,
    pub transform: EnvTransform,
}

const fn row(var: &'static str, path: &'static str) -> EnvMapping {
    EnvMapping {
        var,
        path,
        transform: EnvTransform::Identity,
    }
}

/// Environment variable to configuration path table.
///
/// Rows are applied in order, so the legacy rows at the end win over their
/// current counterparts when both are set.
pub const ENV_MAPPINGS: &[EnvMapping] = &[
    row(SERVER_URL, "server.url"),
    row(ACCESS_KEY, "auth.accessKey"),
    row(PROJECT, "defaults.project"),
    row(DEPLOYMENT_NAME, "defaults.deploymentName"),
    row(API_ENDPOINT, "server.apiEndpoint"),
    EnvMapping {
        var: TIMEOUT,
        path: "server.timeout",
        transform: EnvTransform::ParseInteger,
    },
    row(LEGACY_SERVER_URL, "server.url"),
    row(LEGACY_ACCESS_KEY, "auth.accessKey"),
];

/// Immutable snapshot of environment variables.
///
/// Resolution reads from a snapshot rather than the live process environment,
/// so identical snapshots always resolve identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars(BTreeMap<String, String>);

impl EnvVars {
    /// Snapshot the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        Self(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name` when set and not blank.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// True only for the literal string `true`.
    pub fn is_true(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build the environment source tree from a snapshot.
pub fn load_from_env(env: &EnvVars) -> ConfigTree {
    let mut config = ConfigTree::new();
    for mapping in ENV_MAPPINGS {
        let Some(raw) = env.get(mapping.var) else {
            continue;
        };
        match mapping.transform.apply(raw) {
            Some(value) => config.set_path(mapping.path, value),
            None => warn!(
                var = mapping.var,
                value = raw,
                "Ignoring environment variable with invalid value"
            ),
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_env_contributes_nothing() {
        assert!(load_from_env(&EnvVars::default()).is_empty());
    }

    #[test]
    fn test_timeout_parsed_to_integer() {
        let env: EnvVars = [(TIMEOUT, "5000")].into_iter().collect();
        let config = load_from_env(&env);
        assert_eq!(config.get_leaf("server.timeout"), Some(&json!(5000)));
    }

    #[test]
    fn test_invalid_timeout_skipped() {
        let env: EnvVars = [(TIMEOUT, "soon"), (SERVER_URL, "https://x.io")]
            .into_iter()
            .collect();
        let config = load_from_env(&env);
        assert!(config.get_path("server.timeout").is_none());
        assert_eq!(config.get_leaf("server.url"), Some(&json!("https://x.io")));
    }

    #[test]
    fn test_all_current_variables_mapped() {
        let env: EnvVars = [
            (SERVER_URL, "https://x.io"),
            (ACCESS_KEY, "key"),
            (PROJECT, "app"),
            (DEPLOYMENT_NAME, "Production"),
            (API_ENDPOINT, "/api/v2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            load_from_env(&env).to_json(),
            json!({
                "server": {"url": "https://x.io", "apiEndpoint": "/api/v2"},
                "auth": {"accessKey": "key"},
                "defaults": {"project": "app", "deploymentName": "Production"}
            })
        );
    }

    #[test]
    fn test_legacy_variables_fill_same_paths() {
        let env: EnvVars = [
            (LEGACY_SERVER_URL, "https://legacy.io"),
            (LEGACY_ACCESS_KEY, "old"),
        ]
        .into_iter()
        .collect();
        let config = load_from_env(&env);
        assert_eq!(
            config.get_leaf("server.url"),
            Some(&json!("https://legacy.io"))
        );
        assert_eq!(config.get_leaf("auth.accessKey"), Some(&json!("old")));
    }

    #[test]
    fn test_is_true_is_literal() {
        let env: EnvVars = [(NO_CONFIG, "1")].into_iter().collect();
        assert!(!env.is_true(NO_CONFIG));
        let env: EnvVars = [(NO_CONFIG, "true")].into_iter().collect();
        assert!(env.is_true(NO_CONFIG));
    }
}
