use anyhow::Context;
use clap::Parser;
use console_app::{Cli, Console, ConsoleConfig};
use console_logging::{console_error, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        console_logging::initialize(LogDestination::Both(DEFAULT_LOG_FILE.into()), LevelFilter::Debug);
    } else {
        console_logging::initialize(LogDestination::default(), LevelFilter::Info);
    }

    let mut config = ConsoleConfig::resolve(cli.config.as_deref()).context("loading settings")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    config.validate().context("checking settings")?;

    let mut console = Console::new(&config).context("starting engine")?;
    console.execute(cli.command).inspect_err(|err| console_error!("{}", err))?;
    Ok(())
}
