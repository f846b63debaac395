//! Conversion of CodePush-era flat config files into the nested shape.

use super::tree::ConfigTree;
use serde_json::Value;

/// Rewrite a legacy flat config into the current nested layout.
///
/// Recognised keys:
/// - `accessKey` → `auth.accessKey`
/// - `customServerUrl` (falling back to `serverUrl`) → `server.url`
/// - `preserveAccessKeyOnLogout` → `auth.preserveOnLogout`
///
/// Anything else is dropped.
pub fn convert_legacy(legacy: &ConfigTree) -> ConfigTree {
    let mut config = ConfigTree::new();

    if let Some(access_key) = non_empty_str(legacy, "accessKey") {
        config.set_path("auth.accessKey", Value::from(access_key));
    }

    let server_url = non_empty_str(legacy, "customServerUrl")
        .or_else(|| non_empty_str(legacy, "serverUrl"));
    if let Some(url) = server_url {
        config.set_path("server.url", Value::from(url));
    }

    let preserve = legacy
        .get_leaf("preserveAccessKeyOnLogout")
        .and_then(Value::as_bool);
    if let Some(preserve) = preserve {
        config.set_path("auth.preserveOnLogout", Value::from(preserve));
    }

    config
}

fn non_empty_str<'a>(tree: &'a ConfigTree, key: &str) -> Option<&'a str> {
    tree.get_leaf(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
