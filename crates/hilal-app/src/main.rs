use std::num::NonZeroUsize;

use anyhow::Context;
use clap::Parser;
use hilal_app::cli::{Cli, Command};
use hilal_app::{commands, logging};
use hilal_calendar::Calendar;
use hilal_core::CalendarVariant;
use hilal_core::config::load_config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter_handle = logging::init();

    let config = load_config().context("Failed to load configuration")?;
    tracing::debug!(config = ?config, "Configuration loaded");
    logging::apply_level(
        &filter_handle,
        &logging::effective_level(&config.logging.level, cli.verbose),
    );

    CalendarVariant::set_process_default(config.calendar.variant()?);
    if let Some(capacity) = NonZeroUsize::new(config.calendar.cache_capacity)
        && !Calendar::configure_cache_capacity(capacity)
    {
        tracing::debug!("Keeping the existing month cache");
    }

    let output = match &cli.command {
        Command::Expand(args) => commands::expand(args, &config).context("expand failed")?,
        Command::Convert(args) => commands::convert(args).context("convert failed")?,
        Command::Describe(args) => commands::describe(args, &config).context("describe failed")?,
    };
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
