//! Configuration resolver with ranked-source merging.
//!
//! Loads every source, merges them field by field and records which source
//! supplied each leaf.

use super::env::{self, EnvVars, load_from_env};
use super::files::{FileLoad, ProjectFileSearch};
use super::global::{load_global_config, load_global_config_async};
use super::merge::{merge_configs, track_sources};
use super::tree::ConfigTree;
use super::types::{ConfigLoadResult, ConfigSource, default_config};
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use crate::error::{ResolveError, Result};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Inputs that determine a resolution besides the caller's overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    /// Directory the project-file search starts from
    pub search_from: PathBuf,
    /// Highest directory the search may visit (defaults to `search_from`)
    pub stop_dir: Option<PathBuf>,
    /// Home directory holding the global config, if known
    pub home_dir: Option<PathBuf>,
    /// Environment snapshot
    pub env: EnvVars,
}

impl ResolverOptions {
    /// Options with no home directory and an empty environment.
    pub fn new(search_from: impl Into<PathBuf>) -> Self {
        Self {
            search_from: search_from.into(),
            stop_dir: None,
            home_dir: None,
            env: EnvVars::default(),
        }
    }

    /// Discover options from the running process.
    ///
    /// Fails with [`ResolveError::ProjectRoot`] when the working directory
    /// cannot be read.
    pub fn try_discover() -> Result<Self> {
        let search_from = std::env::current_dir().map_err(ResolveError::ProjectRoot)?;
        Ok(Self::discovered_from(search_from))
    }

    /// Like [`Self::try_discover`], but searches from `.` when the working
    /// directory cannot be read.
    pub fn discover() -> Self {
        match Self::try_discover() {
            Ok(options) => options,
            Err(err) => {
                warn!(error = %err, "Cannot read current directory, searching from \".\"");
                Self::discovered_from(PathBuf::from("."))
            }
        }
    }

    fn discovered_from(search_from: PathBuf) -> Self {
        Self {
            search_from,
            stop_dir: None,
            home_dir: dirs::home_dir(),
            env: EnvVars::from_process(),
        }
    }

    pub fn with_stop_dir(mut self, stop_dir: impl Into<PathBuf>) -> Self {
        self.stop_dir = Some(stop_dir.into());
        self
    }

    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }

    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = env;
        self
    }

    fn stop_dir(&self) -> &Path {
        self.stop_dir.as_deref().unwrap_or(&self.search_from)
    }

    fn files_disabled(&self) -> bool {
        self.env.is_true(env::NO_CONFIG)
    }

    /// `DELIVR_CONFIG_PATH`, resolved against the search directory when relative.
    fn explicit_config_path(&self) -> Option<PathBuf> {
        self.env
            .get_non_empty(env::CONFIG_PATH)
            .map(|p| self.search_from.join(p))
    }

    fn project_search(&self) -> ProjectFileSearch {
        let explicit = self.explicit_config_path();
        ProjectFileSearch::new(&self.search_from, self.stop_dir(), explicit)
    }
}

/// Resolves configuration from all sources in priority order.
///
/// Priority (lowest to highest): defaults, environment, global file,
/// project file, caller overrides. The resolver holds only its options; every
/// call re-reads the filesystem.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    options: ResolverOptions,
}

impl ConfigResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Resolver configured from the running process.
    pub fn discover() -> Self {
        Self::new(ResolverOptions::discover())
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve with blocking file reads.
    pub fn resolve(&self, cli: &ConfigTree) -> ConfigLoadResult {
        let (global, project) = if self.options.files_disabled() {
            debug!("Config files disabled by {}", env::NO_CONFIG);
            (ConfigTree::new(), None)
        } else {
            let global = self
                .options
                .home_dir
                .as_deref()
                .map(load_global_config)
                .unwrap_or_default();
            (global, self.options.project_search().load())
        };
        self.assemble(global, project, cli)
    }

    /// Resolve with async file reads. Produces the same result as [`Self::resolve`].
    pub async fn resolve_async(&self, cli: &ConfigTree) -> ConfigLoadResult {
        let (global, project) = if self.options.files_disabled() {
            debug!("Config files disabled by {}", env::NO_CONFIG);
            (ConfigTree::new(), None)
        } else {
            let global = match self.options.home_dir.as_deref() {
                Some(home) => load_global_config_async(home).await,
                None => ConfigTree::new(),
            };
            (global, self.options.project_search().load_async().await)
        };
        self.assemble(global, project, cli)
    }

    fn assemble(
        &self,
        global: ConfigTree,
        project: Option<FileLoad>,
        cli: &ConfigTree,
    ) -> ConfigLoadResult {
        let defaults = default_config();
        let environment = load_from_env(&self.options.env);
        let (project_config, file_path) = match project {
            Some(load) => (load.config, Some(load.path)),
            None => (ConfigTree::new(), None),
        };

        let ranked = [
            (ConfigSource::Default, &defaults),
            (ConfigSource::Environment, &environment),
            (ConfigSource::GlobalFile, &global),
            (ConfigSource::ProjectFile, &project_config),
            (ConfigSource::Cli, cli),
        ];
        let config = merge_configs(ranked.iter().map(|(_, tree)| *tree));
        let sources = track_sources(ranked);

        if let Some(path) = &file_path {
            debug!(path = %path.display(), "Resolved configuration with project file");
        }

        ConfigLoadResult {
            config,
            sources,
            used_empty_file: file_path.is_none(),
            file_path,
        }
    }
}

static SHARED: OnceLock<ArcSwap<ConfigResolver>> = OnceLock::new();

/// Process-wide resolver, created from the process state on first use.
///
/// The shared instance snapshots the working directory, home directory and
/// environment when it is created. Call [`reset_shared_resolver`] after
/// changing any of them.
pub fn shared_resolver() -> Arc<ConfigResolver> {
    SHARED
        .get_or_init(|| ArcSwap::from_pointee(ConfigResolver::discover()))
        .load_full()
}

/// Replace the shared resolver with one rediscovered from the process.
pub fn reset_shared_resolver() {
    let fresh = ConfigResolver::discover();
    match SHARED.get() {
        Some(shared) => shared.store(Arc::new(fresh)),
        None => {
            let _ = SHARED.set(ArcSwap::from_pointee(fresh));
        }
    }
}

/// Resolve through the shared resolver.
pub fn load_config(cli: &ConfigTree) -> ConfigLoadResult {
    shared_resolver().resolve(cli)
}

/// Async resolve through the shared resolver.
pub async fn load_config_async(cli: &ConfigTree) -> ConfigLoadResult {
    let resolver = shared_resolver();
    resolver.resolve_async(cli).await
}
