use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use credimanager_core::delinquency::loan_standing;
use credimanager_core::{reconcile, schedule, Loan, LoanStatus};

use crate::input;
use crate::store;
use crate::CliContext;

/// Loan contract management
#[derive(Args)]
pub struct LoanArgs {
    #[command(subcommand)]
    pub action: LoanAction,
}

#[derive(Subcommand)]
pub enum LoanAction {
    /// Originate a new loan for an existing borrower
    Add(AddLoanArgs),
    /// Rewrite a loan's contract terms, keeping its payment history
    Update(UpdateLoanArgs),
    /// Remove a loan along with its payments
    Remove(RemoveLoanArgs),
    /// List loans with their current standing
    List(ListLoanArgs),
    /// Print a loan's full installment schedule
    Schedule(ScheduleArgs),
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AddLoanArgs {
    /// Path to a JSON or YAML contract file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower id the contract belongs to
    #[arg(long)]
    pub borrower_id: Option<String>,

    /// Amount disbursed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Monthly rate as a decimal (0.05 = 5% per month)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of equal installments
    #[arg(long)]
    pub installments: Option<u32>,

    /// Contract date (YYYY-MM-DD); the first installment falls due one month later
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct UpdateLoanArgs {
    /// Loan id
    #[arg(long)]
    pub id: String,

    /// Reassign the contract to another borrower
    #[arg(long)]
    pub borrower_id: Option<String>,

    #[arg(long)]
    pub principal: Option<Decimal>,

    #[arg(long)]
    pub rate: Option<Decimal>,

    #[arg(long)]
    pub installments: Option<u32>,

    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct RemoveLoanArgs {
    /// Loan id
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct ListLoanArgs {
    /// Only show loans in this state
    #[arg(long)]
    pub status: Option<StatusFilter>,

    /// Only show loans belonging to this borrower
    #[arg(long)]
    pub borrower_id: Option<String>,
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Loan id
    #[arg(long)]
    pub id: String,
}

/// `--status` filter values. `active` and `paid` match the persisted status;
/// `overdue` matches the date-derived classification.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Active,
    Overdue,
    Paid,
}

/// Contract terms accepted from `--input` files or piped stdin.
#[derive(Debug, Deserialize)]
pub struct LoanDraft {
    pub borrower_id: String,
    pub principal_amount: Decimal,
    pub monthly_rate: Decimal,
    pub installments: u32,
    pub start_date: NaiveDate,
}

pub fn run_loan(args: LoanArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    match args.action {
        LoanAction::Add(a) => run_add(a, ctx),
        LoanAction::Update(a) => run_update(a, ctx),
        LoanAction::Remove(a) => run_remove(a, ctx),
        LoanAction::List(a) => run_list(a, ctx),
        LoanAction::Schedule(a) => run_schedule(a, ctx),
    }
}

fn run_add(args: AddLoanArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: LoanDraft = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(draft) = input::stdin::read_stdin()? {
        draft
    } else {
        LoanDraft {
            borrower_id: args
                .borrower_id
                .ok_or("--borrower-id is required (or provide --input)")?,
            principal_amount: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            installments: args
                .installments
                .ok_or("--installments is required (or provide --input)")?,
            start_date: args
                .start_date
                .ok_or("--start-date is required (or provide --input)")?,
        }
    };

    let book = store::load(&ctx.state_path);
    if book.borrower(&draft.borrower_id).is_none() {
        return Err(format!("no borrower with id '{}'", draft.borrower_id).into());
    }

    let loan = Loan::originate(
        format!("ln-{}", Uuid::new_v4()),
        draft.borrower_id,
        draft.principal_amount,
        draft.monthly_rate,
        draft.installments,
        draft.start_date,
    )?;

    let next = reconcile::originate_loan(&book, loan.clone());
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::to_value(loan)?)
}

fn run_update(args: UpdateLoanArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let current = match book.loan(&args.id) {
        Some(l) => l.clone(),
        None => return Err(format!("no loan with id '{}'", args.id).into()),
    };

    let mut amended = current.amend_terms(
        args.principal.unwrap_or(current.principal_amount),
        args.rate.unwrap_or(current.monthly_rate),
        args.installments.unwrap_or(current.installments),
        args.start_date.unwrap_or(current.start_date),
    )?;

    if let Some(borrower_id) = args.borrower_id {
        if book.borrower(&borrower_id).is_none() {
            return Err(format!("no borrower with id '{}'", borrower_id).into());
        }
        amended.borrower_id = borrower_id;
    }

    let next = reconcile::amend_loan(&book, amended.clone());
    store::save(&ctx.state_path, &next)?;

    // Echo the stored record: amend_loan re-reconciles against the payment
    // history, so derived fields may differ from the bare amendment.
    let stored = next.loan(&amended.id).cloned().unwrap_or(amended);
    Ok(serde_json::to_value(stored)?)
}

fn run_remove(args: RemoveLoanArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    if book.loan(&args.id).is_none() {
        return Err(format!("no loan with id '{}'", args.id).into());
    }

    let payments_removed = book.payments_for(&args.id).len();
    let next = reconcile::remove_loan(&book, &args.id);
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::json!({
        "removed": args.id,
        "payments_removed": payments_removed,
    }))
}

fn run_list(args: ListLoanArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);

    let rows: Vec<Value> = book
        .loans
        .iter()
        .filter(|l| match args.borrower_id {
            Some(ref id) => l.borrower_id == *id,
            None => true,
        })
        .filter_map(|l| {
            let standing = loan_standing(l, ctx.today).ok();
            let overdue = standing
                .as_ref()
                .map(|s| s.delinquency.is_overdue())
                .unwrap_or(false);

            let keep = match args.status {
                None => true,
                Some(StatusFilter::Active) => l.status == LoanStatus::Active,
                Some(StatusFilter::Paid) => l.status == LoanStatus::Paid,
                Some(StatusFilter::Overdue) => overdue,
            };
            if !keep {
                return None;
            }

            let borrower = book
                .borrower(&l.borrower_id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "unknown".to_string());

            Some(serde_json::json!({
                "id": l.id,
                "borrower": borrower,
                "principal_amount": l.principal_amount,
                "installments": l.installments,
                "status": l.status.to_string(),
                "total_paid": l.total_paid,
                "remaining_balance": l.remaining_balance,
                "next_due_date": standing.as_ref().map(|s| s.next_due_date),
                "state": standing.as_ref().map(|s| s.delinquency.to_string()),
            }))
        })
        .collect();

    Ok(Value::Array(rows))
}

fn run_schedule(args: ScheduleArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let loan = match book.loan(&args.id) {
        Some(l) => l,
        None => return Err(format!("no loan with id '{}'", args.id).into()),
    };

    let installment = loan.installment_amount()?;
    let covered = schedule::installments_covered(loan.total_paid, installment);

    let rows: Vec<Value> = schedule::due_dates(loan.start_date, loan.installments)
        .iter()
        .enumerate()
        .map(|(i, due)| {
            serde_json::json!({
                "installment": i + 1,
                "due_date": due,
                "amount": installment,
                "covered": (i as u32) < covered,
            })
        })
        .collect();

    Ok(Value::Array(rows))
}
