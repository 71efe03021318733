use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = commands::run_command(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
