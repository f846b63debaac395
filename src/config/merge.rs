//! Deep merge of ranked configuration trees.
//!
//! Later trees take precedence over earlier ones, field by field.
//! Arrays are replaced entirely, not concatenated.

use super::tree::{ConfigTree, ConfigValue, join_path};
use super::types::{ConfigSource, ProvenanceMap};

/// Deep merge `overlay` into `base`, with `overlay` taking precedence.
///
/// - Nodes are merged recursively: keys in overlay override keys in base
/// - Leaves (strings, numbers, booleans, arrays) replace whatever is in base
/// - A leaf overriding a node replaces the whole node
/// - A node holding no leaves (only `null`s in the source) is ignored
///
/// # Example
/// ```
/// use serde_json::json;
/// use delivr_resolve::config::{ConfigTree, deep_merge};
///
/// let mut base = ConfigTree::from_json(json!({
///     "server": { "url": "http://localhost:3000", "apiEndpoint": "/api/v1" }
/// })).unwrap();
/// let overlay = ConfigTree::from_json(json!({
///     "server": { "url": "https://x.io" }
/// })).unwrap();
/// deep_merge(&mut base, &overlay);
/// assert_eq!(
///     base.to_json(),
///     json!({ "server": { "url": "https://x.io", "apiEndpoint": "/api/v1" } })
/// );
/// ```
pub fn deep_merge(base: &mut ConfigTree, overlay: &ConfigTree) {
    for (key, overlay_value) in overlay.iter() {
        let overlay_node = match overlay_value {
            ConfigValue::Leaf(_) => {
                base.insert(key.clone(), overlay_value.clone());
                continue;
            }
            ConfigValue::Node(node) => node,
        };
        // A mapping that sets nothing must not disturb the base.
        if !overlay_node.has_leaves() {
            continue;
        }
        if let Some(ConfigValue::Node(base_node)) = base.get_mut(key) {
            deep_merge(base_node, overlay_node);
        } else {
            let mut node = ConfigTree::new();
            deep_merge(&mut node, overlay_node);
            base.insert(key.clone(), ConfigValue::Node(node));
        }
    }
}

/// Merge trees in priority order (lowest first).
///
/// Equivalent to folding `deep_merge` over the list, starting from an empty tree.
pub fn merge_configs<'a>(configs: impl IntoIterator<Item = &'a ConfigTree>) -> ConfigTree {
    configs.into_iter().fold(ConfigTree::new(), |mut merged, config| {
        deep_merge(&mut merged, config);
        merged
    })
}

/// Record which source supplied each leaf of the merged tree.
///
/// Walks the same ranked list `merge_configs` folds over, so the resulting key
/// set is exactly the merged tree's leaf paths.
pub fn track_sources<'a>(
    configs: impl IntoIterator<Item = (ConfigSource, &'a ConfigTree)>,
) -> ProvenanceMap {
    let mut sources = ProvenanceMap::new();
    for (source, config) in configs {
        record_sources(&mut sources, source, config, "");
    }
    sources
}

fn record_sources(
    sources: &mut ProvenanceMap,
    source: ConfigSource,
    tree: &ConfigTree,
    prefix: &str,
) {
    for (key, value) in tree.iter() {
        let path = join_path(prefix, key);
        match value {
            ConfigValue::Node(child) if !child.has_leaves() => {}
            ConfigValue::Node(child) => {
                // A node replaces a leaf at the same path.
                sources.remove(&path);
                record_sources(sources, source, child, &path);
            }
            ConfigValue::Leaf(_) => {
                // A leaf replaces everything beneath it.
                let nested = format!("{path}.");
                sources.retain(|existing, _| !existing.starts_with(&nested));
                sources.insert(path, source);
            }
        }
    }
}
