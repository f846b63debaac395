//! Integration tests for ranked configuration resolution.
//!
//! Every test builds an isolated home directory, project tree and
//! environment snapshot, so nothing depends on the machine running it.

use delivr_resolve::config::{
    ConfigResolver, ConfigSource, ConfigTree, EnvVars, ResolverOptions, default_config,
    merge_configs, vars,
};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    home: PathBuf,
    project: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let home = temp.path().join("home");
        let project = temp.path().join("workspace").join("app");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&project).unwrap();
        Self {
            _temp: temp,
            home,
            project,
        }
    }

    fn write_global(&self, content: &str) {
        let dir = self.home.join(".delivr");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), content).unwrap();
    }

    fn write_project(&self, name: &str, content: &str) {
        std::fs::write(self.project.join(name), content).unwrap();
    }

    fn resolver(&self, env: &[(&str, &str)]) -> ConfigResolver {
        let env: EnvVars = env.iter().copied().collect();
        ConfigResolver::new(
            ResolverOptions::new(&self.project)
                .with_home_dir(&self.home)
                .with_env(env),
        )
    }
}

fn tree(value: Value) -> ConfigTree {
    ConfigTree::from_json(value).expect("object")
}

fn leaf<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a Value> {
    tree.get_leaf(path)
}

#[test]
fn test_merge_non_destruction() {
    let defaults = tree(json!({
        "server": {"url": "http://localhost:3000", "apiEndpoint": "/api/v1"}
    }));
    let cli = tree(json!({"server": {"url": "https://x.io"}}));

    assert_eq!(
        merge_configs([&defaults, &cli]).to_json(),
        json!({"server": {"url": "https://x.io", "apiEndpoint": "/api/v1"}})
    );
}

#[test]
fn test_priority_law_across_all_sources() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"server": {"url": "https://global.io"}, "defaults": {"project": "global"}}"#,
    );
    fx.write_project(
        ".delivrrc.yaml",
        "server:\n  url: https://project.io\nauth:\n  accessKey: project-key\n",
    );
    let resolver = fx.resolver(&[
        (vars::SERVER_URL, "https://env.io"),
        (vars::DEPLOYMENT_NAME, "Production"),
        (vars::ACCESS_KEY, "env-key"),
    ]);
    let cli = tree(json!({"server": {"url": "https://cli.io"}}));

    let result = resolver.resolve(&cli);
    let config = &result.config;

    assert_eq!(leaf(config, "server.url"), Some(&json!("https://cli.io")));
    assert_eq!(result.sources["server.url"], ConfigSource::Cli);

    assert_eq!(leaf(config, "auth.accessKey"), Some(&json!("project-key")));
    assert_eq!(result.sources["auth.accessKey"], ConfigSource::ProjectFile);

    assert_eq!(leaf(config, "defaults.project"), Some(&json!("global")));
    assert_eq!(result.sources["defaults.project"], ConfigSource::GlobalFile);

    assert_eq!(
        leaf(config, "defaults.deploymentName"),
        Some(&json!("Production"))
    );
    assert_eq!(
        result.sources["defaults.deploymentName"],
        ConfigSource::Environment
    );

    assert_eq!(leaf(config, "server.apiEndpoint"), Some(&json!("/api/v1")));
    assert_eq!(result.sources["server.apiEndpoint"], ConfigSource::Default);
}

#[test]
fn test_provenance_keys_match_leaf_set() {
    let fx = Fixture::new();
    fx.write_project(
        ".delivrrc.json",
        r#"{
            "release": {"mandatory": true, "rollout": 50},
            "defaults": {"platforms": ["ios", "android"]}
        }"#,
    );
    let result = fx
        .resolver(&[(vars::TIMEOUT, "1000")])
        .resolve(&ConfigTree::new());

    let mut leaves = result.config.leaf_paths();
    leaves.sort();
    let keys: Vec<String> = result.sources.keys().cloned().collect();
    assert_eq!(keys, leaves);
    assert_eq!(
        result.sources["defaults.platforms"],
        ConfigSource::ProjectFile
    );
}

#[test]
fn test_idempotent_resolution() {
    let fx = Fixture::new();
    fx.write_global(r#"{"auth": {"accessKey": "g"}}"#);
    fx.write_project(".delivrrc", "defaults:\n  project: app\n");
    let resolver = fx.resolver(&[(vars::TIMEOUT, "2500")]);
    let cli = tree(json!({"defaults": {"deploymentName": "Production"}}));

    let first = resolver.resolve(&cli);
    let second = resolver.resolve(&cli);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_env_timeout_is_integer() {
    let fx = Fixture::new();
    let result = fx
        .resolver(&[(vars::TIMEOUT, "5000")])
        .resolve(&ConfigTree::new());

    assert_eq!(leaf(&result.config, "server.timeout"), Some(&json!(5000)));
    assert_eq!(result.settings().unwrap().server.timeout, Some(5000));
    assert_eq!(result.sources["server.timeout"], ConfigSource::Environment);
}

#[test]
fn test_invalid_env_timeout_keeps_default() {
    let fx = Fixture::new();
    let result = fx
        .resolver(&[(vars::TIMEOUT, "fast")])
        .resolve(&ConfigTree::new());

    assert_eq!(leaf(&result.config, "server.timeout"), Some(&json!(30000)));
    assert_eq!(result.sources["server.timeout"], ConfigSource::Default);
}

#[test]
fn test_legacy_env_variables() {
    let fx = Fixture::new();
    let result = fx
        .resolver(&[(vars::LEGACY_ACCESS_KEY, "codepush-key")])
        .resolve(&ConfigTree::new());
    assert_eq!(
        leaf(&result.config, "auth.accessKey"),
        Some(&json!("codepush-key"))
    );
}

#[test]
fn test_malformed_project_file_degrades_to_defaults() {
    let fx = Fixture::new();
    fx.write_project(".delivrrc.json", "{ \"server\": ");

    let result = fx.resolver(&[]).resolve(&ConfigTree::new());
    assert_eq!(result.config, default_config());
    assert!(result.used_empty_file);
    assert!(result.file_path.is_none());
}

#[test]
fn test_scalar_replaces_mapping() {
    let fx = Fixture::new();
    fx.write_project(
        ".delivrrc.json",
        r#"{"build": {"android": {"variant": "release"}}}"#,
    );

    let result = fx.resolver(&[]).resolve(&tree(json!({"build": "skip"})));
    assert_eq!(leaf(&result.config, "build"), Some(&json!("skip")));
    assert_eq!(result.sources["build"], ConfigSource::Cli);
    assert!(!result.sources.contains_key("build.android.variant"));
}

#[test]
fn test_search_does_not_climb_past_stop_dir() {
    let fx = Fixture::new();
    let parent = fx.project.parent().unwrap().to_path_buf();
    std::fs::write(
        parent.join(".delivrrc.json"),
        r#"{"defaults": {"project": "parent"}}"#,
    )
    .unwrap();

    let default_stop = fx.resolver(&[]).resolve(&ConfigTree::new());
    assert!(default_stop.config.get_path("defaults.project").is_none());

    let widened = ConfigResolver::new(
        ResolverOptions::new(&fx.project)
            .with_stop_dir(&parent)
            .with_home_dir(&fx.home),
    )
    .resolve(&ConfigTree::new());
    assert_eq!(
        leaf(&widened.config, "defaults.project"),
        Some(&json!("parent"))
    );
    assert_eq!(widened.file_path, Some(parent.join(".delivrrc.json")));
}

#[test]
fn test_legacy_project_file_converted() {
    let fx = Fixture::new();
    fx.write_project(
        ".code-push.config",
        r#"{
            "accessKey": "legacy",
            "serverUrl": "https://legacy.io",
            "preserveAccessKeyOnLogout": true
        }"#,
    );

    let result = fx.resolver(&[]).resolve(&ConfigTree::new());
    let settings = result.settings().unwrap();
    assert_eq!(settings.auth.access_key.as_deref(), Some("legacy"));
    assert_eq!(settings.auth.preserve_on_logout, Some(true));
    assert_eq!(settings.server.url.as_deref(), Some("https://legacy.io"));
    assert_eq!(result.sources["server.url"], ConfigSource::ProjectFile);
    assert!(!result.used_empty_file);
}

#[test]
fn test_explicit_config_path_bypasses_search() {
    let fx = Fixture::new();
    fx.write_project(".delivrrc.json", r#"{"defaults": {"project": "searched"}}"#);
    let explicit = fx.home.join("ci.toml");
    std::fs::write(&explicit, "[defaults]\nproject = \"explicit\"\n").unwrap();

    let explicit_str = explicit.to_str().unwrap();
    let result = fx
        .resolver(&[(vars::CONFIG_PATH, explicit_str)])
        .resolve(&ConfigTree::new());
    assert_eq!(
        leaf(&result.config, "defaults.project"),
        Some(&json!("explicit"))
    );
    assert_eq!(result.file_path.as_deref(), Some(Path::new(explicit_str)));
}

#[test]
fn test_no_config_ignores_files_but_keeps_env() {
    let fx = Fixture::new();
    fx.write_global(r#"{"defaults": {"project": "global"}}"#);
    fx.write_project(".delivrrc.json", r#"{"defaults": {"project": "project"}}"#);

    let result = fx
        .resolver(&[(vars::NO_CONFIG, "true"), (vars::PROJECT, "env")])
        .resolve(&ConfigTree::new());
    assert_eq!(
        leaf(&result.config, "defaults.project"),
        Some(&json!("env"))
    );
    assert!(result.used_empty_file);
}

#[tokio::test]
async fn test_async_matches_sync() {
    let fx = Fixture::new();
    fx.write_global(r#"{"auth": {"accessKey": "g"}}"#);
    fx.write_project(
        "delivr.config.json",
        r#"{"distribution": {"channel": "beta"}}"#,
    );
    let resolver = fx.resolver(&[(vars::API_ENDPOINT, "/api/v2")]);
    let cli = tree(json!({"server": {"timeout": 10}}));

    let sync = resolver.resolve(&cli);
    let async_ = resolver.resolve_async(&cli).await;
    assert_eq!(sync, async_);
    assert_eq!(
        leaf(&async_.config, "distribution.channel"),
        Some(&json!("beta"))
    );
}
