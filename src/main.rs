use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use tld_reconciler::cli::{run, Cli};
use tld_reconciler::config::AppConfig;
use tld_reconciler::utils::logger::{init_logger, level_for_verbosity};

#[actix_web::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let level = level_for_verbosity(cli.verbose, cli.command.default_log_level());
    init_logger(config.log_dir.as_deref(), level)?;

    run(cli, config).await
}
