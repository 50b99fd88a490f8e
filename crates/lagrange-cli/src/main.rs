use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Derive(args) => args.run(),
        Command::Check(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "lagrange", version, about = "Equations of motion from Lagrangian mechanics")]
struct Cli {
    /// Log at debug level, ignoring RUST_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive and print the solved accelerations of a system.
    Derive(cli::derive::DeriveArgs),
    /// Validate a system file without deriving.
    Check(cli::check::CheckArgs),
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
