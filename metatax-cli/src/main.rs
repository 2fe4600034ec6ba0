use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use metatax_core::MetataxError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = e
            .downcast_ref::<MetataxError>()
            .map_or(1, MetataxError::exit_code);
        process::exit(exit_code);
    }
}

/// Log level from METATAX_LOG (default "warn"), raised by each `-v`
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => std::env::var("METATAX_LOG").unwrap_or_else(|_| "warn".to_string()),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = metatax_core::resolve_config(cli.config.as_deref())?;
    tracing::debug!("Resolved configuration: {:?}", config);

    match cli.command {
        Commands::Annotate(args) => crate::cli::commands::annotate::run(args, &config),
        Commands::Lineage(args) => crate::cli::commands::lineage::run(args, &config),
        Commands::Split(args) => crate::cli::commands::split::run(args, &config),
    }
}
