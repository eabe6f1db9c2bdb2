// EB Env Backup: Application Entry Point
//
// Parses CLI arguments, initializes structured logging (with a filter that
// never emits secret values), and dispatches to the command handler.
// Runs on a current-thread tokio runtime: every external call is awaited in
// sequence.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use eb_env_backup::cli::{execute, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // RUST_LOG=eb_env_backup=debug for verbose output. No level ever
    // includes passphrases, data keys or decrypted payloads.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eb_env_backup=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
