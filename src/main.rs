mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use ffstream::{config, context::AppContext};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ffstream=debug,ffstream_av=debug".to_string()
        } else {
            "ffstream=info,ffstream_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;
    let ctx = AppContext::new(config);

    let command = cli.command.into_command();
    tracing::debug!("Running {}", command.name());
    command.run(&ctx)
}
