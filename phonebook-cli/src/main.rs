//! phonebook CLI - serves the phone book web pages
//!
//! - `serve`: run the HTTP server
//! - `check`: verify the database is reachable

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::check::{run_check, CheckArgs};
use commands::serve::{run_serve, ServeArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "phonebook",
    author,
    version,
    about = "Phone book record manager with a server-rendered web front end"
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server
    Serve(ServeArgs),
    /// Check that the configured database is reachable
    Check(CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables win over .env entries
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Check(args) => run_check(args).await,
    }
}
