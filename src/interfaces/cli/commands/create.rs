//! Create link command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::CreateLinkRequest;
use crate::system::AppContext;

pub async fn create_link(
    ctx: &AppContext,
    short_code: String,
    target_url: String,
    password: String,
    host: Option<String>,
) -> Result<(), CliError> {
    let created = ctx
        .links
        .create_link(CreateLinkRequest {
            short_code,
            target_url,
            password,
            host,
        })
        .await?;

    println!(
        "{} Created short link: {} -> {}",
        "✓".bold().green(),
        created.short_code.cyan(),
        created.target_url.blue().underline()
    );

    if let Some(short_url) = created.short_url {
        println!("  {}", short_url.magenta());
    }

    if !created.analytics_recorded {
        println!(
            "{} Stats could not be initialized, visits will not be counted for this target",
            "⚠".bold().yellow()
        );
    }

    Ok(())
}
