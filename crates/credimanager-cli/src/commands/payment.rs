use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use credimanager_core::{reconcile, Payment, PaymentKind};

use crate::input;
use crate::store;
use crate::CliContext;

/// Payment recording and history
#[derive(Args)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub action: PaymentAction,
}

#[derive(Subcommand)]
pub enum PaymentAction {
    /// Record a payment against a loan
    Add(AddPaymentArgs),
    /// Correct a recorded payment's amount, date, kind or notes
    Update(UpdatePaymentArgs),
    /// Delete a payment record (the borrower's score is not reverted)
    Remove(RemovePaymentArgs),
    /// List payments, optionally for one loan
    List(ListPaymentArgs),
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AddPaymentArgs {
    /// Path to a JSON or YAML payment file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan id the payment applies to
    #[arg(long)]
    pub loan_id: Option<String>,

    /// Amount paid (must be positive)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Payment date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// How the payment applies to the contract
    #[arg(long, default_value = "total")]
    pub kind: KindArg,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct UpdatePaymentArgs {
    /// Payment id
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub kind: Option<KindArg>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct RemovePaymentArgs {
    /// Payment id
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct ListPaymentArgs {
    /// Only show payments for this loan
    #[arg(long)]
    pub loan_id: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Total,
    Interest,
    Principal,
}

impl From<KindArg> for PaymentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Total => PaymentKind::Total,
            KindArg::Interest => PaymentKind::Interest,
            KindArg::Principal => PaymentKind::Principal,
        }
    }
}

/// Payment fields accepted from `--input` files or piped stdin.
#[derive(Debug, Deserialize)]
pub struct PaymentDraft {
    pub loan_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub kind: PaymentKind,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn run_payment(
    args: PaymentArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    match args.action {
        PaymentAction::Add(a) => run_add(a, ctx),
        PaymentAction::Update(a) => run_update(a, ctx),
        PaymentAction::Remove(a) => run_remove(a, ctx),
        PaymentAction::List(a) => run_list(a, ctx),
    }
}

fn run_add(args: AddPaymentArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: PaymentDraft = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(draft) = input::stdin::read_stdin()? {
        draft
    } else {
        PaymentDraft {
            loan_id: args
                .loan_id
                .ok_or("--loan-id is required (or provide --input)")?,
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            date: args.date.ok_or("--date is required (or provide --input)")?,
            kind: args.kind.into(),
            notes: args.notes,
        }
    };

    let book = store::load(&ctx.state_path);
    if book.loan(&draft.loan_id).is_none() {
        return Err(format!("no loan with id '{}'", draft.loan_id).into());
    }

    let payment = Payment::new(
        format!("pay-{}", Uuid::new_v4()),
        draft.loan_id,
        draft.amount,
        draft.date,
        draft.kind,
        draft.notes,
    )?;

    let next = reconcile::record_payment(&book, payment.clone());
    store::save(&ctx.state_path, &next)?;

    let loan = next.loan(&payment.loan_id).cloned();
    let borrower_score = loan
        .as_ref()
        .and_then(|l| next.borrower(&l.borrower_id))
        .map(|b| b.score);

    Ok(serde_json::json!({
        "payment": payment,
        "loan": loan,
        "borrower_score": borrower_score,
    }))
}

fn run_update(
    args: UpdatePaymentArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let current = match book.payment(&args.id) {
        Some(p) => p.clone(),
        None => return Err(format!("no payment with id '{}'", args.id).into()),
    };

    let updated = Payment::new(
        current.id.clone(),
        current.loan_id.clone(),
        args.amount.unwrap_or(current.amount),
        args.date.unwrap_or(current.date),
        args.kind.map(Into::into).unwrap_or(current.kind),
        args.notes.or(current.notes),
    )?;

    let next = reconcile::amend_payment(&book, updated.clone());
    store::save(&ctx.state_path, &next)?;

    let loan = next.loan(&updated.loan_id).cloned();
    let borrower_score = loan
        .as_ref()
        .and_then(|l| next.borrower(&l.borrower_id))
        .map(|b| b.score);

    Ok(serde_json::json!({
        "payment": updated,
        "loan": loan,
        "borrower_score": borrower_score,
    }))
}

fn run_remove(
    args: RemovePaymentArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let current = match book.payment(&args.id) {
        Some(p) => p.clone(),
        None => return Err(format!("no payment with id '{}'", args.id).into()),
    };

    let next = reconcile::remove_payment(&book, &args.id);
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::json!({
        "removed": current.id,
        "loan": next.loan(&current.loan_id).cloned(),
    }))
}

fn run_list(args: ListPaymentArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);

    let mut payments: Vec<&Payment> = book
        .payments
        .iter()
        .filter(|p| match args.loan_id {
            Some(ref id) => p.loan_id == *id,
            None => true,
        })
        .collect();
    payments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    let rows: Vec<Value> = payments
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "loan_id": p.loan_id,
                "amount": p.amount,
                "date": p.date,
                "kind": p.kind.to_string(),
                "notes": p.notes,
            })
        })
        .collect();

    Ok(Value::Array(rows))
}
