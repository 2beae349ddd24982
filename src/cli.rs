//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for linkstat using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::analytics::Granularity;

/// linkstat - URL shortener core with visit analytics
#[derive(Parser)]
#[command(name = "linkstat")]
#[command(version)]
#[command(about = "URL shortener core with per-link visit analytics", long_about = None)]
pub struct Cli {
    /// Path to config file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Pin the current time (RFC3339 or YYYY-MM-DD), useful for replaying data
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create (or repoint) a short link
    Create {
        /// Short code, letters, numbers and hyphens
        short_code: String,

        /// Target URL (http or https)
        target_url: String,

        /// Shared password
        #[arg(long)]
        password: String,

        /// Public host name, used for the short URL and loop detection
        #[arg(long)]
        host: Option<String>,
    },

    /// Resolve a short code and record the visit
    Visit {
        /// Short code to visit
        short_code: String,

        /// Visitor IP (default: unknown)
        #[arg(long)]
        ip: Option<String>,

        /// Host the request came in on
        #[arg(long)]
        host: Option<String>,
    },

    /// Show visit stats and the click chart
    Stats {
        /// Short code to query
        short_code: String,

        /// Shared password
        #[arg(long)]
        password: String,

        /// Force a granularity (daily, weekly, monthly) instead of picking by age
        #[arg(long)]
        granularity: Option<Granularity>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stats_granularity() {
        let cli = Cli::try_parse_from([
            "linkstat",
            "stats",
            "abc",
            "--password",
            "pw",
            "--granularity",
            "week",
        ])
        .unwrap();
        match cli.command {
            Commands::Stats { granularity, .. } => {
                assert_eq!(granularity, Some(Granularity::Weekly))
            }
            _ => panic!("expected stats"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_granularity() {
        assert!(
            Cli::try_parse_from([
                "linkstat",
                "stats",
                "abc",
                "--password",
                "pw",
                "--granularity",
                "hourly",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_global_now() {
        let cli =
            Cli::try_parse_from(["linkstat", "visit", "abc", "--now", "2024-03-01"]).unwrap();
        assert_eq!(cli.now.as_deref(), Some("2024-03-01"));
    }
}
