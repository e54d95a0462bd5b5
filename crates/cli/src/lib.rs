pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tidyquote",
    about = "Tidyquote operator CLI",
    long_about = "Price quote requests, validate rate tables, and inspect runtime readiness.",
    after_help = "Examples:\n  tidyquote quote --request request.json\n  tidyquote rates --path config/rates.json\n  tidyquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a quote request file and print the itemized breakdown")]
    Quote {
        #[arg(long, help = "Path to a JSON quote request")]
        request: PathBuf,
        #[arg(long, help = "Rate table path (defaults to the configured pricing.rates_path)")]
        rates: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Load and validate a rate table document")]
    Rates {
        #[arg(long, help = "Rate table path (defaults to the configured pricing.rates_path)")]
        path: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, rate table readiness, and LLM configuration")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { request, rates, json } => {
            commands::quote::run(&request, rates.as_deref(), json)
        }
        Command::Rates { path } => commands::rates::run(path.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
