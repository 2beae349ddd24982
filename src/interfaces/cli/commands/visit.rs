//! Visit command

use colored::Colorize;

use crate::errors::LinkstatError;
use crate::interfaces::cli::CliError;
use crate::services::Resolution;
use crate::system::AppContext;

pub async fn visit_link(
    ctx: &AppContext,
    short_code: &str,
    ip: Option<&str>,
    host: Option<&str>,
) -> Result<(), CliError> {
    match ctx.links.resolve_visit(short_code, host, ip).await? {
        Resolution::Redirect(target) => {
            println!(
                "{} {} -> {}",
                "→".bold().green(),
                short_code.cyan(),
                target.blue().underline()
            );
            Ok(())
        }
        Resolution::NotFound => Err(LinkstatError::not_found(format!(
            "Short link not found: {}",
            short_code
        ))
        .into()),
        Resolution::Invalid => Err(CliError::CommandError(format!(
            "Short link {} has an invalid target",
            short_code
        ))),
    }
}
