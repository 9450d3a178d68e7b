use napi::Result as NapiResult;
use napi_derive::napi;

use credimanager_core::{Loan, LoanBook, Payment};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct TermsBindingInput {
    principal_amount: rust_decimal::Decimal,
    monthly_rate: rust_decimal::Decimal,
    installments: u32,
}

#[napi]
pub fn installment_amount(input_json: String) -> NapiResult<String> {
    let terms: TermsBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::schedule::installment_amount(
        terms.principal_amount,
        terms.monthly_rate,
        terms.installments,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ReconcileBindingInput {
    loan: Loan,
    payments: Vec<Payment>,
}

#[napi]
pub fn reconcile_loan(input_json: String) -> NapiResult<String> {
    let input: ReconcileBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::reconcile_loan(&input.loan, &input.payments);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct PaymentEventInput {
    book: LoanBook,
    payment: Payment,
}

#[derive(serde::Deserialize)]
struct RemovalInput {
    book: LoanBook,
    id: String,
}

#[napi]
pub fn record_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentEventInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::record_payment(&input.book, input.payment);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amend_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentEventInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::amend_payment(&input.book, input.payment);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn remove_payment(input_json: String) -> NapiResult<String> {
    let input: RemovalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::remove_payment(&input.book, &input.id);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn remove_borrower(input_json: String) -> NapiResult<String> {
    let input: RemovalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::remove_borrower(&input.book, &input.id);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn remove_loan(input_json: String) -> NapiResult<String> {
    let input: RemovalInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::reconcile::remove_loan(&input.book, &input.id);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct StandingBindingInput {
    loan: Loan,
    today: chrono::NaiveDate,
}

#[napi]
pub fn loan_standing(input_json: String) -> NapiResult<String> {
    let input: StandingBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::delinquency::loan_standing(&input.loan, input.today)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct SummaryBindingInput {
    book: LoanBook,
    today: chrono::NaiveDate,
}

#[napi]
pub fn portfolio_summary(input_json: String) -> NapiResult<String> {
    let input: SummaryBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = credimanager_core::portfolio::portfolio_summary(&input.book, input.today);
    serde_json::to_string(&output).map_err(to_napi_error)
}
