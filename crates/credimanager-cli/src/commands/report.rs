use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use credimanager_core::advisory::risk_dossier;
use credimanager_core::{portfolio, schedule, seed};

use crate::input;
use crate::store;
use crate::CliContext;

/// Arguments for the standalone installment calculator
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PmtArgs {
    /// Path to a JSON or YAML terms file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount disbursed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly rate as a decimal (0.05 = 5% per month)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of equal installments
    #[arg(long)]
    pub installments: Option<u32>,

    /// Optional contract date; adds the due-date schedule to the output
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for writing the built-in starter book
#[derive(Args)]
pub struct SeedArgs {
    /// Overwrite an existing snapshot
    #[arg(long)]
    pub force: bool,
}

/// Arguments for composing a borrower's risk-review brief
#[derive(Args)]
pub struct AdvisoryArgs {
    /// Borrower id
    #[arg(long)]
    pub id: String,
}

/// Contract terms accepted by `pmt` from `--input` files or piped stdin.
#[derive(Debug, Deserialize)]
pub struct PmtDraft {
    pub principal_amount: Decimal,
    pub monthly_rate: Decimal,
    pub installments: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_status(ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let summary = portfolio::portfolio_summary(&book, ctx.today);
    Ok(serde_json::to_value(summary)?)
}

pub fn run_overdue(ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let report = portfolio::arrears_report(&book, ctx.today);
    Ok(serde_json::to_value(report)?)
}

pub fn run_agenda(ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let agenda = portfolio::payment_agenda(&book, ctx.today);
    Ok(serde_json::to_value(agenda)?)
}

pub fn run_pmt(args: PmtArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: PmtDraft = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(draft) = input::stdin::read_stdin()? {
        draft
    } else {
        PmtDraft {
            principal_amount: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            installments: args
                .installments
                .ok_or("--installments is required (or provide --input)")?,
            start_date: args.start_date,
        }
    };

    let installment = schedule::installment_amount(
        draft.principal_amount,
        draft.monthly_rate,
        draft.installments,
    )?;
    let total = schedule::total_contract_value(
        draft.principal_amount,
        draft.monthly_rate,
        draft.installments,
    )?;

    Ok(serde_json::json!({
        "principal_amount": draft.principal_amount,
        "monthly_rate": draft.monthly_rate,
        "installments": draft.installments,
        "installment_amount": installment,
        "total_contract_value": total,
        "accrued_interest": total - draft.principal_amount,
        "due_dates": draft
            .start_date
            .map(|start| schedule::due_dates(start, draft.installments)),
    }))
}

pub fn run_advisory(
    args: AdvisoryArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let borrower = match book.borrower(&args.id) {
        Some(b) => b,
        None => return Err(format!("no borrower with id '{}'", args.id).into()),
    };

    let dossier = risk_dossier(borrower, &book.loans);

    Ok(serde_json::json!({
        "borrower_id": borrower.id,
        "name": borrower.name,
        "dossier": dossier,
    }))
}

pub fn run_seed(args: SeedArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    if ctx.state_path.exists() && !args.force {
        return Err(format!(
            "'{}' already exists; pass --force to overwrite it",
            ctx.state_path.display()
        )
        .into());
    }

    let book = seed::seed_book();
    store::save(&ctx.state_path, &book)?;

    Ok(serde_json::json!({
        "path": ctx.state_path.display().to_string(),
        "borrowers": book.borrowers.len(),
        "loans": book.loans.len(),
        "payments": book.payments.len(),
    }))
}
