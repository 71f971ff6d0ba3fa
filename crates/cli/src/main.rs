/// Entry point for the vigil CLI, a static analyzer for deployed EVM bytecode.
///
/// Parses command-line arguments, initializes logging and dispatches to the `decode`,
/// `selectors` and `analyze` subcommands.
use clap::Parser;
use commands::{Cmd, Command};
use tracing_subscriber::EnvFilter;

mod commands;

/// Command-line interface for vigil.
///
/// Input bytecode is given as a hex string (0x...) or as a file path prefixed with @.
#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "vigil: static risk analysis of deployed EVM bytecode")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
