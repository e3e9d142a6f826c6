//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for SensorSync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// SensorSync - instrument metadata enrichment
#[derive(Parser, Debug)]
#[command(name = "sensorsync")]
#[command(version, about, long_about = None)]
#[command(author = "SensorSync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sensorsync.toml", env = "SENSORSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SENSORSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and list the resulting bindings
    ValidateConfig(commands::validate::ValidateArgs),

    /// Fetch and map a reference without writing anything
    Resolve(commands::resolve::ResolveArgs),

    /// Run a full synchronization against an in-memory store
    Sync(commands::sync::SyncArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["sensorsync", "validate-config"]);
        assert_eq!(cli.config, "sensorsync.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "sensorsync",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "init",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_resolve() {
        let cli = Cli::parse_from([
            "sensorsync",
            "resolve",
            "--catalog",
            "urn:catalog",
            "--attribute",
            "urn:attr",
            "sms:42",
        ]);
        match cli.command {
            Commands::Resolve(args) => {
                assert_eq!(args.reference, "sms:42");
                assert_eq!(args.catalog, "urn:catalog");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_sync_defaults() {
        let cli = Cli::parse_from([
            "sensorsync",
            "sync",
            "--catalog",
            "urn:catalog",
            "--attribute",
            "urn:attr",
            "gfzgipp:1",
        ]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.project_id, 1);
                assert_eq!(args.set_index, 0);
                assert!(args.schema.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
