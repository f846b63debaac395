//! Config file discovery and parsing.
//!
//! Project files are searched upward from a starting directory across a fixed
//! list of names; the first existing, non-empty, parseable file wins. Legacy
//! CodePush files are only consulted when that search finds nothing.
//!
//! Searching is split from reading so the sync and async loaders walk exactly
//! the same candidate list and only differ in how they read a file.

use super::legacy::convert_legacy;
use super::tree::ConfigTree;
use crate::error::ConfigError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project config file names, in priority order within a directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".delivrrc",
    ".delivrrc.json",
    ".delivrrc.yaml",
    ".delivrrc.yml",
    ".delivrrc.toml",
    "delivr.config.json",
    "delivr.config.yaml",
    "delivr.config.toml",
];

/// CodePush-era project files, checked only in the starting directory.
pub const LEGACY_CONFIG_FILES: &[&str] = &[
    ".codepush",
    ".codepush.config",
    ".code-push.config",
    ".dota.config",
];

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
    /// No recognised extension: try JSON, then YAML.
    Auto,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => FileFormat::Json,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Yaml => "YAML",
            FileFormat::Toml => "TOML",
            FileFormat::Auto => "JSON or YAML",
        }
    }
}

/// Parse file contents into a tree.
///
/// Returns `Ok(None)` for a blank file or a document that is just `null`.
pub fn parse_config(path: &Path, content: &str) -> Result<Option<ConfigTree>, ConfigError> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    let format = FileFormat::from_path(path);
    let value: Value = match format {
        FileFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::parse(path, format.as_str(), e))?
        }
        FileFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::parse(path, format.as_str(), e))?
        }
        FileFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::parse(path, format.as_str(), e))?
        }
        FileFormat::Auto => match serde_json::from_str(content) {
            Ok(value) => value,
            Err(_) => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::parse(path, format.as_str(), e))?,
        },
    };

    match value {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(ConfigTree::from_json(value)),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// What reading one candidate file produced.
#[derive(Debug)]
pub enum Probe {
    /// File does not exist.
    Missing,
    /// File exists but holds nothing.
    Empty,
    /// File exists but could not be read or parsed.
    Malformed(ConfigError),
    Loaded(ConfigTree),
}

impl Probe {
    /// Interpret the outcome of reading `path`.
    pub fn from_read(path: &Path, read: std::io::Result<String>) -> Self {
        let content = match read {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Probe::Missing,
            Err(e) => return Probe::Malformed(ConfigError::io(path, e)),
        };
        match parse_config(path, &content) {
            Ok(Some(tree)) => Probe::Loaded(tree),
            Ok(None) => Probe::Empty,
            Err(e) => Probe::Malformed(e),
        }
    }

    /// Read and interpret `path` synchronously.
    pub fn read(path: &Path) -> Self {
        Self::from_read(path, std::fs::read_to_string(path)).logged(path)
    }

    /// Read and interpret `path` on the tokio runtime.
    pub async fn read_async(path: &Path) -> Self {
        Self::from_read(path, tokio::fs::read_to_string(path).await).logged(path)
    }

    fn logged(self, path: &Path) -> Self {
        match &self {
            Probe::Malformed(err) => {
                warn!(path = %path.display(), error = %err, "Failed to load config file");
            }
            Probe::Empty => debug!(path = %path.display(), "Skipping empty config file"),
            Probe::Loaded(_) => debug!(path = %path.display(), "Loaded config file"),
            Probe::Missing => {}
        }
        self
    }

    pub fn into_tree(self) -> Option<ConfigTree> {
        match self {
            Probe::Loaded(tree) => Some(tree),
            _ => None,
        }
    }
}

/// A project-local file that contributed to resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct FileLoad {
    pub config: ConfigTree,
    pub path: PathBuf,
    /// Converted from a legacy CodePush file
    pub legacy: bool,
}

/// Ordered list of files the project source will try.
#[derive(Debug, Clone)]
pub struct ProjectFileSearch {
    /// Explicit file from `DELIVR_CONFIG_PATH`
    pub explicit: Option<PathBuf>,
    /// Current-format candidates, nearest directory first
    pub candidates: Vec<PathBuf>,
    /// Legacy candidates in the starting directory
    pub legacy: Vec<PathBuf>,
}

impl ProjectFileSearch {
    /// Plan a search from `search_from` up to and including `stop_dir`.
    ///
    /// When `stop_dir` is not an ancestor of `search_from` the search runs up to
    /// the filesystem root.
    pub fn new(search_from: &Path, stop_dir: &Path, explicit: Option<PathBuf>) -> Self {
        let candidates = search_directories(search_from, stop_dir)
            .into_iter()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .collect();
        let legacy = LEGACY_CONFIG_FILES
            .iter()
            .map(|name| search_from.join(name))
            .collect();
        Self {
            explicit,
            candidates,
            legacy,
        }
    }

    /// Run the search with blocking reads.
    pub fn load(&self) -> Option<FileLoad> {
        if let Some(path) = &self.explicit
            && let Some(config) = Probe::read(path).into_tree()
        {
            return Some(FileLoad::current(config, path));
        }
        for path in &self.candidates {
            if let Some(config) = Probe::read(path).into_tree() {
                return Some(FileLoad::current(config, path));
            }
        }
        for path in &self.legacy {
            if let Some(config) = Probe::read(path).into_tree() {
                return Some(FileLoad::converted(&config, path));
            }
        }
        None
    }

    /// Run the search with async reads. Same order and outcome as [`Self::load`].
    pub async fn load_async(&self) -> Option<FileLoad> {
        if let Some(path) = &self.explicit
            && let Some(config) = Probe::read_async(path).await.into_tree()
        {
            return Some(FileLoad::current(config, path));
        }
        for path in &self.candidates {
            if let Some(config) = Probe::read_async(path).await.into_tree() {
                return Some(FileLoad::current(config, path));
            }
        }
        for path in &self.legacy {
            if let Some(config) = Probe::read_async(path).await.into_tree() {
                return Some(FileLoad::converted(&config, path));
            }
        }
        None
    }
}

impl FileLoad {
    fn current(config: ConfigTree, path: &Path) -> Self {
        Self {
            config,
            path: path.to_path_buf(),
            legacy: false,
        }
    }

    fn converted(legacy: &ConfigTree, path: &Path) -> Self {
        debug!(path = %path.display(), "Converting legacy config file");
        Self {
            config: convert_legacy(legacy),
            path: path.to_path_buf(),
            legacy: true,
        }
    }
}

/// Directories visited by the upward search, nearest first.
pub fn search_directories(search_from: &Path, stop_dir: &Path) -> Vec<PathBuf> {
    let mut visited = Vec::new();
    for dir in search_from.ancestors() {
        visited.push(dir.to_path_buf());
        if dir == stop_dir {
            break;
        }
    }
    visited
}
