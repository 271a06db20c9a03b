//! Flushlog CLI entry point.

use clap::Parser;

use flushlog::cli::{commands, handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, config).await,
        Commands::Config(args) => commands::config::execute(args, config),
    };

    if let Err(err) = result {
        handle_error(&err);
    }
}
