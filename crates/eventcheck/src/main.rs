mod cmd;
mod config;
mod error;
mod invoke;
mod journal;
mod paths;
mod status;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eventcheck", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the notification check once and append a completion record
    Run(cmd::RunArgs),
    /// Verify the project directory, interpreter, and journal path
    Preflight(cmd::PreflightArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; cron's mail/log mechanism picks them up.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => cmd::run_check(args).await,
        Command::Preflight(args) => cmd::run_preflight(args).await.map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
