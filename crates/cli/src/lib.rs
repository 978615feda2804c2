pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "railrefund",
    about = "Railrefund operator CLI",
    long_about = "Look up a PNR and compare refunds across the cancellation checkpoints, offline or live.",
    after_help = "Examples:\n  railrefund lookup 4521789630 --payment-method debit-card\n  railrefund scenarios --record pnr.json --now \"2025-03-13 03:00\"\n  railrefund doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fetch a PNR from the provider and print its cancellation scenarios")]
    Lookup {
        #[arg(help = "10-digit PNR number")]
        pnr: String,
        #[arg(long, help = "Payment method used at booking (defaults to refund.default_payment_method)")]
        payment_method: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Evaluate cancellation scenarios from a saved provider response")]
    Scenarios {
        #[arg(long, help = "Path to a saved PNR status response or bare record")]
        record: PathBuf,
        #[arg(long, help = "PNR to assume when the record does not carry one")]
        pnr: Option<String>,
        #[arg(long, help = "Payment method used at booking (defaults to refund.default_payment_method)")]
        payment_method: Option<String>,
        #[arg(long, help = "Evaluation time as `YYYY-MM-DD HH:MM` local time (defaults to now)")]
        now: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List supported payment methods, optionally with the charges on an amount")]
    PaymentMethods {
        #[arg(long, help = "Amount in rupees to price each method against")]
        amount: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, API key readiness, and gateway client setup")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Lookup { pnr, payment_method, json } => {
            commands::lookup::run(&pnr, payment_method.as_deref(), json)
        }
        Command::Scenarios { record, pnr, payment_method, now, json } => {
            commands::scenarios::run(commands::scenarios::ScenarioArgs {
                record,
                pnr,
                payment_method,
                now,
                json,
            })
        }
        Command::PaymentMethods { amount } => commands::payment_methods::run(amount.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
