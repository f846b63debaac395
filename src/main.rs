//! delivr-resolve
//!
//! Prints the configuration the delivr CLI would run with, and the directory
//! it would take React Native bundles from.

use anyhow::{Context, Result};
use clap::Parser;
use delivr_resolve::cli::{Cli, Command, ConfigCommand, OutputPathArgs, parse_value, validate_key};
use delivr_resolve::config::{
    ConfigLoadResult, ConfigResolver, ResolverOptions, clear_global_config, load_global_config,
    save_global_config,
};
use delivr_resolve::logging::{LogTarget, init_logging};
use delivr_resolve::output::{OutputPathOptions, format_detection_message, resolve_output_path};
use std::path::PathBuf;
use tracing::{debug, info};

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("cannot determine home directory")
}

async fn resolve(cli: &Cli) -> Result<ConfigLoadResult> {
    let resolver = ConfigResolver::new(ResolverOptions::try_discover()?);
    debug!(search_from = %resolver.options().search_from.display(), "Resolving configuration");
    Ok(resolver.resolve_async(&cli.overrides()).await)
}

async fn run_config(cli: &Cli, action: &ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Show { json, sources } => {
            let result = resolve(cli).await?;
            if *json {
                let value = if *sources {
                    serde_json::to_value(&result)?
                } else {
                    result.config.to_json()
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            for path in result.config.leaf_paths() {
                let value = result.config.get_leaf(&path).cloned().unwrap_or_default();
                match result.sources.get(&path).filter(|_| *sources) {
                    Some(source) => println!("{path} = {value}  ({source})"),
                    None => println!("{path} = {value}"),
                }
            }
            match &result.file_path {
                Some(path) => println!("\nProject config: {}", path.display()),
                None => println!("\nProject config: none"),
            }
        }
        ConfigCommand::Get { key } => {
            let key = validate_key(key)?;
            let result = resolve(cli).await?;
            match result.config.get_path(key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
                None => println!("undefined"),
            }
        }
        ConfigCommand::SetGlobal { key, value } => {
            let key = validate_key(key)?;
            let home = home_dir()?;
            let mut global = load_global_config(&home);
            global.set_path(key, parse_value(value));
            let path = save_global_config(&home, &global)?;
            info!(key, path = %path.display(), "Updated global config");
        }
        ConfigCommand::ClearGlobal => {
            let home = home_dir()?;
            if clear_global_config(&home)? {
                info!("Removed global config");
            } else {
                info!("No global config to remove");
            }
        }
    }
    Ok(())
}

fn run_output_path(cli: &Cli, args: &OutputPathArgs) -> Result<()> {
    let options = OutputPathOptions {
        user_output_dir: args.output_dir.clone(),
        platform: args.platform,
        project_root: args.project_root.clone(),
        verbose: cli.verbose,
        most_recent: args.most_recent,
    };
    let result = resolve_output_path(&options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_detection_message(&result));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    match &cli.command {
        Command::Config { action } => run_config(&cli, action).await,
        Command::OutputPath(args) => run_output_path(&cli, args),
    }
}
