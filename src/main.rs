use anyhow::Result;
use clap::Parser;
use geolab::cli::Cli;
use geolab::commands;

fn main() -> Result<()> {
    // Parse CLI arguments first so --verbose can raise the filter
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "geolab=debug,info"
    } else {
        "geolab=info,warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Execute command
    commands::execute(cli)
}
