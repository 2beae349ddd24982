//! CLI interface module
//!
//! This module provides command-line interface functionality for linkstat.
//!
//! Each invocation is a separate process, so the auth rate limiter state is
//! loaded from storage on start and saved back after gated commands.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Cli, Commands, ConfigCommands};
use tracing::warn;

use crate::config::get_config;
use crate::errors::LinkstatError;
use crate::services::ServiceError;
use crate::system::AppContext;
use crate::utils::clock::{Clock, ManualClock, SystemClock};
use crate::utils::parse_datetime;
use commands::{create_link, generate_config, show_stats, visit_link};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkstatError> for CliError {
    fn from(err: LinkstatError) -> Self {
        match err {
            LinkstatError::NotFound(msg) => CliError::CommandError(msg),
            LinkstatError::DateParse(msg) => CliError::ParseError(msg),
            other => CliError::StorageError(other.to_string()),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(e) => CliError::StorageError(e.to_string()),
            other => CliError::CommandError(other.to_string()),
        }
    }
}

/// 解析 `--now`，未指定时使用系统时钟
fn clock_from_arg(now: Option<&str>) -> Result<Arc<dyn Clock>, CliError> {
    match now {
        Some(raw) => {
            let at = parse_datetime(raw).map_err(|e| {
                CliError::ParseError(format!(
                    "Invalid time '{}' ({}), expected RFC3339 or YYYY-MM-DD",
                    raw,
                    e.message()
                ))
            })?;
            Ok(Arc::new(ManualClock::new(at)))
        }
        None => Ok(SystemClock::arc()),
    }
}

/// Run a CLI command from clap-parsed input
///
/// Reads the global configuration, so `init_config` must run first.
pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    // Generate doesn't need storage
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cli.command
    {
        return generate_config(output_path, force).await;
    }

    let config = get_config();
    let clock = clock_from_arg(cli.now.as_deref())?;
    let ctx = AppContext::build(&config, clock).await?;

    match cli.command {
        Commands::Create {
            short_code,
            target_url,
            password,
            host,
        } => {
            let result = create_link(&ctx, short_code, target_url, password, host).await;
            persist_limiter(&ctx).await;
            result
        }

        Commands::Visit {
            short_code,
            ip,
            host,
        } => visit_link(&ctx, &short_code, ip.as_deref(), host.as_deref()).await,

        Commands::Stats {
            short_code,
            password,
            granularity,
            json,
        } => {
            let result = show_stats(&ctx, &short_code, &password, granularity, json).await;
            persist_limiter(&ctx).await;
            result
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }
}

/// 保存失败只记录日志，不改变命令结果
async fn persist_limiter(ctx: &AppContext) {
    if let Err(e) = ctx.persist_limiter().await {
        warn!("Failed to save rate limiter state: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::GateError;
    use std::time::Duration;

    #[test]
    fn test_clock_from_arg() {
        let clock = clock_from_arg(Some("2024-03-01")).unwrap();
        assert_eq!(clock.now().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(clock_from_arg(Some("yesterday")).is_err());
    }

    #[test]
    fn test_service_error_mapping() {
        let err: CliError = ServiceError::Gate(GateError::TemporarilyUnavailable {
            retry_after: Duration::from_secs(30),
        })
        .into();
        assert!(matches!(err, CliError::CommandError(_)));

        let err: CliError = ServiceError::Storage(LinkstatError::file_operation("disk")).into();
        assert!(matches!(err, CliError::StorageError(_)));
    }

    #[test]
    fn test_linkstat_error_mapping() {
        let err: CliError = LinkstatError::not_found("Short link not found: abc").into();
        assert_eq!(err.format_simple(), "Command error: Short link not found: abc");

        let err: CliError = LinkstatError::date_parse("bad").into();
        assert!(matches!(err, CliError::ParseError(_)));

        let err: CliError = LinkstatError::file_operation("disk").into();
        assert!(matches!(err, CliError::StorageError(_)));
    }
}
