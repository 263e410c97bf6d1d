use clap::Parser;
use std::io;
use std::process;
use tops_cli::{Cli, TopsConfig};
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = TopsConfig::load(cli.config.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|config| {
            debug!(?config, "loaded configuration");
            commands::handle(&cli.command, &config, cli.format)
        });

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}
