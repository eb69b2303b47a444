//! plantos-setup binary entry point.

use clap::Parser;
use plantos_setup::cli::{Cli, Commands, InstallArgs};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv(); // load .env if present, ignore error
    let cli = Cli::parse();

    let result = match cli
        .command
        .unwrap_or_else(|| Commands::Install(InstallArgs::default()))
    {
        Commands::Install(args) => plantos_setup::cli::install::handle_install(args).await,
        Commands::Uninstall(args) => plantos_setup::cli::install::handle_uninstall(args),
        Commands::Status(args) => plantos_setup::cli::install::handle_status(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
