use anyhow::Result;
use clap::Parser;
use tabspace::cli::{self, Cli};
use tabspace_config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded before logging so the config's level can take part in level selection.
    let config = Config::load()?;

    // CLI --log-level takes precedence, then RUST_LOG, then config.
    let level = tabspace::debug::init_log_bridge(cli.log_level, config.log_level);
    log::info!(
        "Starting tabspace {} (log level {})",
        tabspace::VERSION,
        level.display_name()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(cli::run(cli, config));

    if let Err(ref e) = result {
        log::error!("tabspace failed: {e:#}");
        eprintln!("tabspace: error: {e:#}");
    }
    result
}
