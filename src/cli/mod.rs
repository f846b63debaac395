//! CLI command definitions for delivr-resolve
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::ConfigTree;
use crate::error::ResolveError;
use crate::output::Platform;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Resolve delivr configuration and locate React Native bundle output
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server URL (overrides every other source)
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Access key (overrides every other source)
    #[arg(long, global = true)]
    pub access_key: Option<String>,

    /// Default project name
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Default deployment name
    #[arg(long, global = true)]
    pub deployment_name: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Override tree built from the global flags.
    pub fn overrides(&self) -> ConfigTree {
        let mut tree = ConfigTree::new();
        let flags = [
            ("server.url", &self.server_url),
            ("auth.accessKey", &self.access_key),
            ("defaults.project", &self.project),
            ("defaults.deploymentName", &self.deployment_name),
        ];
        for (path, value) in flags {
            if let Some(value) = value {
                tree.set_path(path, Value::from(value.as_str()));
            }
        }
        tree
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or edit resolved configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Resolve the directory bundles for a platform come from
    OutputPath(OutputPathArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Include which source supplied each value
        #[arg(long)]
        sources: bool,
    },

    /// Print one resolved value by dot-path, e.g. `server.url`
    Get { key: String },

    /// Write a value to the global config file
    ///
    /// The value is stored as JSON when it parses as JSON, otherwise as a string.
    SetGlobal { key: String, value: String },

    /// Delete the global config file
    ClearGlobal,
}

#[derive(Args, Debug)]
pub struct OutputPathArgs {
    /// Target platform: android or ios
    #[arg(short, long)]
    pub platform: Platform,

    /// Use this directory instead of detecting one
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Prefer the newest build over template order
    #[arg(long)]
    pub most_recent: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Check that `key` is a dot-path with no empty segments.
pub fn validate_key(key: &str) -> Result<&str, ResolveError> {
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ResolveError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

/// Interpret a command-line value: JSON when it parses, a plain string otherwise.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_global_flags_become_overrides() {
        let cli = Cli::parse_from([
            "delivr-resolve",
            "--server-url",
            "https://x.io",
            "--deployment-name",
            "Production",
            "config",
            "show",
        ]);
        assert_eq!(
            cli.overrides().to_json(),
            json!({"server": {"url": "https://x.io"}, "defaults": {"deploymentName": "Production"}})
        );
    }

    #[test]
    fn test_no_flags_no_overrides() {
        let cli = Cli::parse_from(["delivr-resolve", "config", "get", "server.url"]);
        assert!(cli.overrides().is_empty());
        assert!(matches!(
            cli.command,
            Command::Config { action: ConfigCommand::Get { ref key } } if key == "server.url"
        ));
    }

    #[test]
    fn test_output_path_args() {
        let cli = Cli::parse_from([
            "delivr-resolve",
            "output-path",
            "--platform",
            "ios",
            "--most-recent",
        ]);
        let Command::OutputPath(args) = cli.command else {
            panic!("expected output-path");
        };
        assert_eq!(args.platform, Platform::Ios);
        assert!(args.most_recent);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let args = ["delivr-resolve", "output-path", "--platform", "web"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("server.url").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("server..url").is_err());
        assert!(validate_key(".server").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("5000"), json!(5000));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("https://x.io"), json!("https://x.io"));
    }
}
