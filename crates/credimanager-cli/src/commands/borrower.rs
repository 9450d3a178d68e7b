use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use credimanager_core::reconcile;
use credimanager_core::{Borrower, EmergencyContact};

use crate::input;
use crate::store;
use crate::CliContext;

/// Borrower record management
#[derive(Args)]
pub struct BorrowerArgs {
    #[command(subcommand)]
    pub action: BorrowerAction,
}

#[derive(Subcommand)]
pub enum BorrowerAction {
    /// Register a new borrower
    Add(AddBorrowerArgs),
    /// Edit a borrower's profile (the score is never editable)
    Update(UpdateBorrowerArgs),
    /// Remove a borrower along with their loans and payments
    Remove(RemoveBorrowerArgs),
    /// List all borrowers
    List,
    /// Show one borrower's behaviour score
    Score(ScoreArgs),
}

#[derive(Args)]
pub struct AddBorrowerArgs {
    /// Path to a JSON or YAML profile file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Government identity number (CPF, SSN, ...)
    #[arg(long)]
    pub national_id: Option<String>,

    /// Phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct UpdateBorrowerArgs {
    /// Borrower id
    #[arg(long)]
    pub id: String,

    /// Path to a JSON or YAML profile file (replaces the whole profile)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub national_id: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct RemoveBorrowerArgs {
    /// Borrower id
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Borrower id
    #[arg(long)]
    pub id: String,
}

/// Profile fields accepted from `--input` files or piped stdin. The score is
/// deliberately absent: it only ever moves through payment reconciliation.
#[derive(Debug, Deserialize)]
pub struct BorrowerDraft {
    pub name: String,
    pub national_id: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn run_borrower(
    args: BorrowerArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    match args.action {
        BorrowerAction::Add(a) => run_add(a, ctx),
        BorrowerAction::Update(a) => run_update(a, ctx),
        BorrowerAction::Remove(a) => run_remove(a, ctx),
        BorrowerAction::List => run_list(ctx),
        BorrowerAction::Score(a) => run_score(a, ctx),
    }
}

fn run_add(args: AddBorrowerArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let draft: BorrowerDraft = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(draft) = input::stdin::read_stdin()? {
        draft
    } else {
        BorrowerDraft {
            name: args.name.ok_or("--name is required (or provide --input)")?,
            national_id: args
                .national_id
                .ok_or("--national-id is required (or provide --input)")?,
            phone: args.phone.ok_or("--phone is required (or provide --input)")?,
            email: args.email.unwrap_or_default(),
            address: args.address.unwrap_or_default(),
            emergency_contacts: Vec::new(),
            notes: args.notes,
        }
    };

    let book = store::load(&ctx.state_path);

    let mut borrower = Borrower::register(
        format!("b-{}", Uuid::new_v4()),
        draft.name,
        draft.national_id,
        draft.phone,
        draft.email,
        draft.address,
    );
    borrower.emergency_contacts = draft.emergency_contacts;
    borrower.notes = draft.notes;

    let next = reconcile::register_borrower(&book, borrower.clone());
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::to_value(borrower)?)
}

fn run_update(
    args: UpdateBorrowerArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let current = match book.borrower(&args.id) {
        Some(b) => b.clone(),
        None => return Err(format!("no borrower with id '{}'", args.id).into()),
    };

    let updated = if let Some(ref path) = args.input {
        apply_draft(current, input::file::read_input(path)?)
    } else if let Some(draft) = input::stdin::read_stdin()? {
        apply_draft(current, draft)
    } else {
        let mut b = current;
        if let Some(name) = args.name {
            b.name = name;
        }
        if let Some(national_id) = args.national_id {
            b.national_id = national_id;
        }
        if let Some(phone) = args.phone {
            b.phone = phone;
        }
        if let Some(email) = args.email {
            b.email = email;
        }
        if let Some(address) = args.address {
            b.address = address;
        }
        if let Some(notes) = args.notes {
            b.notes = Some(notes);
        }
        b
    };

    let next = reconcile::amend_borrower(&book, updated.clone());
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::to_value(updated)?)
}

fn run_remove(
    args: RemoveBorrowerArgs,
    ctx: &CliContext,
) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    if book.borrower(&args.id).is_none() {
        return Err(format!("no borrower with id '{}'", args.id).into());
    }

    let loan_ids: Vec<String> = book
        .loans_for(&args.id)
        .iter()
        .map(|l| l.id.clone())
        .collect();
    let payments_removed = book
        .payments
        .iter()
        .filter(|p| loan_ids.contains(&p.loan_id))
        .count();

    let next = reconcile::remove_borrower(&book, &args.id);
    store::save(&ctx.state_path, &next)?;

    Ok(serde_json::json!({
        "removed": args.id,
        "loans_removed": loan_ids.len(),
        "payments_removed": payments_removed,
    }))
}

fn run_list(ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);

    let rows: Vec<Value> = book
        .borrowers
        .iter()
        .map(|b| {
            serde_json::json!({
                "id": b.id,
                "name": b.name,
                "national_id": b.national_id,
                "phone": b.phone,
                "score": b.score,
                "loans": book.loans_for(&b.id).len(),
            })
        })
        .collect();

    Ok(Value::Array(rows))
}

fn run_score(args: ScoreArgs, ctx: &CliContext) -> Result<Value, Box<dyn std::error::Error>> {
    let book = store::load(&ctx.state_path);
    let borrower = match book.borrower(&args.id) {
        Some(b) => b,
        None => return Err(format!("no borrower with id '{}'", args.id).into()),
    };

    Ok(serde_json::json!({
        "id": borrower.id,
        "name": borrower.name,
        "score": borrower.score,
    }))
}

/// Replace the profile fields with a full draft, keeping id and score.
fn apply_draft(borrower: Borrower, draft: BorrowerDraft) -> Borrower {
    Borrower {
        name: draft.name,
        national_id: draft.national_id,
        phone: draft.phone,
        email: draft.email,
        address: draft.address,
        emergency_contacts: draft.emergency_contacts,
        notes: draft.notes,
        ..borrower
    }
}
