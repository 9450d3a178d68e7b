mod commands;
mod input;
mod output;
mod store;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::borrower::BorrowerArgs;
use commands::loan::LoanArgs;
use commands::payment::PaymentArgs;
use commands::report::{AdvisoryArgs, PmtArgs, SeedArgs};

/// Installment-loan book keeping: borrowers, loans, payments and scores
#[derive(Parser)]
#[command(
    name = "credi",
    version,
    about = "Installment-loan tracking with decimal precision",
    long_about = "A CLI for managing a small lending book: borrower records with \
                  behaviour scores, fixed-installment loans, payment reconciliation, \
                  due-date agendas and arrears reporting. State lives in a JSON \
                  snapshot file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to the book snapshot
    #[arg(long, default_value = "credimanager.json", global = true)]
    state: String,

    /// Reference date (YYYY-MM-DD); defaults to the system date
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage borrower records
    Borrower(BorrowerArgs),
    /// Manage loan contracts
    Loan(LoanArgs),
    /// Record and manage payments
    Payment(PaymentArgs),
    /// Portfolio summary: balances, interest, status counts
    Status,
    /// Loans past a due date, deepest in arrears first
    Overdue,
    /// Installments falling due within the next week
    Agenda,
    /// Price a contract without touching the book
    Pmt(PmtArgs),
    /// Compose the risk-review brief for one borrower
    Advisory(AdvisoryArgs),
    /// Write the built-in starter book to the snapshot path
    Seed(SeedArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Ambient settings every command handler receives.
pub struct CliContext {
    pub state_path: PathBuf,
    pub today: NaiveDate,
}

fn main() {
    let cli = Cli::parse();

    let ctx = CliContext {
        state_path: PathBuf::from(&cli.state),
        today: cli.today.unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Borrower(args) => commands::borrower::run_borrower(args, &ctx),
        Commands::Loan(args) => commands::loan::run_loan(args, &ctx),
        Commands::Payment(args) => commands::payment::run_payment(args, &ctx),
        Commands::Status => commands::report::run_status(&ctx),
        Commands::Overdue => commands::report::run_overdue(&ctx),
        Commands::Agenda => commands::report::run_agenda(&ctx),
        Commands::Pmt(args) => commands::report::run_pmt(args),
        Commands::Advisory(args) => commands::report::run_advisory(args, &ctx),
        Commands::Seed(args) => commands::report::run_seed(args, &ctx),
        Commands::Version => {
            println!("credi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
