use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use linkstat::cli::Cli;
use linkstat::config::init_config;
use linkstat::interfaces::cli::run_cli;
use linkstat::system::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = init_config(cli.config.as_deref());
    // guard 必须存活到进程结束，否则缓冲的日志会丢失
    let log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    debug!("Configuration: {:?}", config.storage);

    if let Err(e) = run_cli(cli).await {
        eprintln!("{}", e.format_colored());
        // process::exit 不会执行析构，先把缓冲的日志写完
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
