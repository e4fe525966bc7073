use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use weld::domain::config::{LoggingConfig, WeldConfig};
use weld::kernel::config::load_config;
use weld::logger::{Logger, parse_level};
use weld_cli::args::{Cli, Commands};
use weld_cli::commands::scan;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cfg: WeldConfig =
        load_config(cli.config.as_ref()).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Scan { files, strict, json } => scan::run(&cfg, &files, strict, json),
    }
}

fn init_logger(logging: &LoggingConfig, level: Option<&str>) -> anyhow::Result<Option<Logger>> {
    if !logging.console && logging.directory.is_none() {
        return Ok(None);
    }

    let level = parse_level(level.unwrap_or(&logging.level))?;
    let mut builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).console(logging.console);
    if let Some(directory) = &logging.directory {
        builder = builder.directory(directory).json(logging.json);
    }
    Ok(Some(builder.init().context("Critical: Logger initialization failed")?))
}
