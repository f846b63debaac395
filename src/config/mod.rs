//! Ranked configuration resolution.
//!
//! Merges five sources field by field, lowest priority first:
//! 1. **Defaults** - built in
//! 2. **Environment** - `DELIVR_*` variables (plus two `CODE_PUSH_*` names)
//! 3. **Global file** - `~/.delivr/config.json` (legacy `~/.dota.config`)
//! 4. **Project file** - `.delivrrc` family, searched upward (legacy CodePush files)
//! 5. **Overrides** - supplied by the caller, usually from command-line flags
//!
//! ## Merge Strategy
//! - Nested mappings merge key by key; siblings set by lower sources survive
//! - Scalars and arrays replace whole, including a mapping at the same path
//! - Every resolved leaf records the source that supplied it
//!
//! ## Environment Variables
//! - `DELIVR_CONFIG_PATH` - Explicit project config file (bypasses the search)
//! - `DELIVR_NO_CONFIG` - `true` ignores the global and project files

mod env;
mod files;
mod global;
mod legacy;
mod loader;
mod merge;
mod tree;
mod types;

pub use env::{ENV_MAPPINGS, EnvMapping, EnvTransform, EnvVars, load_from_env};
pub use files::{
    CONFIG_FILE_NAMES, FileFormat, FileLoad, LEGACY_CONFIG_FILES, ProjectFileSearch, parse_config,
};
pub use global::{
    clear_global_config, global_config_path, legacy_global_config_path, load_global_config,
    load_global_config_async, save_global_config,
};
pub use legacy::convert_legacy;
pub use loader::{
    ConfigResolver, ResolverOptions, load_config, load_config_async, reset_shared_resolver,
    shared_resolver,
};
pub use merge::{deep_merge, merge_configs, track_sources};
pub use tree::{ConfigTree, ConfigValue};
pub use types::*;

/// Names of the environment variables read by the resolver.
pub mod vars {
    pub use super::env::{
        ACCESS_KEY, API_ENDPOINT, CONFIG_PATH, DEPLOYMENT_NAME, LEGACY_ACCESS_KEY,
        LEGACY_SERVER_URL, NO_CONFIG, PROJECT, SERVER_URL, TIMEOUT,
    };
}
