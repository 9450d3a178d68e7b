//! Snapshot-to-snapshot reconciliation of the lending book.
//!
//! Covers:
//! 1. **Loan reconciliation** -- recompute `total_paid`, `remaining_balance`
//!    and the Paid/Active transition from the full payment set.
//! 2. **Payment events** -- record, amend and remove payments, keeping the
//!    owning loan and the borrower score in lockstep.
//! 3. **Record upkeep** -- register/amend/remove borrowers and loans, with
//!    removals cascading to every dependent record.
//!
//! Every operation takes the current [`LoanBook`] by reference and returns
//! a new book; the input snapshot is never mutated. Unknown identifiers are
//! no-ops that hand back an unchanged copy, never errors.
//!
//! Two asymmetries are deliberate and match the system's bookkeeping rules:
//! the score delta for a payment is judged against the due date derived
//! from the loan's state *before* the event (for an amend, the stored
//! `total_paid` still including the payment's old amount), and removing a
//! payment never reverses the score adjustment its recording caused.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::schedule;
use crate::score;
use crate::types::{Borrower, Loan, LoanBook, Money, Payment};

// ---------------------------------------------------------------------------
// Loan reconciliation
// ---------------------------------------------------------------------------

/// Recompute one loan's derived fields from a payment set.
///
/// Payments belonging to other loans are ignored, so callers can pass the
/// whole book's payment list. The balance is floored at zero; the status
/// follows [`crate::types::LoanStatus::settle`].
pub fn reconcile_loan(loan: &Loan, payments: &[Payment]) -> Loan {
    let total_paid: Money = payments
        .iter()
        .filter(|p| p.loan_id == loan.id)
        .map(|p| p.amount)
        .sum();
    let remaining_balance = (loan.total_contract_value() - total_paid).max(Decimal::ZERO);

    Loan {
        total_paid,
        remaining_balance,
        status: loan.status.settle(remaining_balance),
        ..loan.clone()
    }
}

/// Whole installments covered by the loan's recorded `total_paid`. Falls
/// back to zero coverage when the stored terms are not computable.
fn coverage_baseline(loan: &Loan) -> u32 {
    match loan.installment_amount() {
        Ok(installment) => schedule::installments_covered(loan.total_paid, installment),
        Err(_) => 0,
    }
}

/// Score delta for a payment landing on `payment_date`, judged against the
/// next due date implied by the loan's state before the event.
fn timing_delta_for(loan: &Loan, payment_date: NaiveDate) -> i8 {
    let due_date = schedule::next_due_date(loan.start_date, coverage_baseline(loan));
    score::timing_delta(due_date, payment_date)
}

/// Re-reconcile `loan_id` inside an already-updated payment set and, for
/// payment events, fold the timing delta into the borrower's score.
fn apply_reconciliation(mut book: LoanBook, loan_id: &str, score_delta: Option<i8>) -> LoanBook {
    let pos = match book.loans.iter().position(|l| l.id == loan_id) {
        Some(pos) => pos,
        None => return book,
    };

    let reconciled = reconcile_loan(&book.loans[pos], &book.payments);
    let borrower_id = reconciled.borrower_id.clone();
    book.loans[pos] = reconciled;

    if let Some(delta) = score_delta {
        if let Some(borrower) = book.borrowers.iter_mut().find(|b| b.id == borrower_id) {
            borrower.score = score::apply_delta(borrower.score, delta);
        }
    }

    book
}

// ---------------------------------------------------------------------------
// Payment events
// ---------------------------------------------------------------------------

/// Record a payment against its loan: append it, adjust the borrower score
/// by the payment's timing delta, then reconcile the loan.
///
/// No-ops when the loan is unknown or the payment id is already taken.
pub fn record_payment(book: &LoanBook, payment: Payment) -> LoanBook {
    if book.payment(&payment.id).is_some() {
        return book.clone();
    }
    let loan = match book.loan(&payment.loan_id) {
        Some(loan) => loan,
        None => return book.clone(),
    };

    let delta = timing_delta_for(loan, payment.date);
    let loan_id = loan.id.clone();

    let mut next = book.clone();
    next.payments.push(payment);
    apply_reconciliation(next, &loan_id, Some(delta))
}

/// Replace an existing payment wholesale and reconcile its loan.
///
/// The timing delta is judged against the loan's current stored state; the
/// replaced payment's old amount is not backed out of that baseline first.
pub fn amend_payment(book: &LoanBook, updated: Payment) -> LoanBook {
    let pos = match book.payments.iter().position(|p| p.id == updated.id) {
        Some(pos) => pos,
        None => return book.clone(),
    };
    let loan = match book.loan(&updated.loan_id) {
        Some(loan) => loan,
        None => return book.clone(),
    };

    let delta = timing_delta_for(loan, updated.date);
    let loan_id = loan.id.clone();

    let mut next = book.clone();
    next.payments[pos] = updated;
    apply_reconciliation(next, &loan_id, Some(delta))
}

/// Remove a payment and reconcile its loan. The borrower's score keeps any
/// adjustment the payment earned when it was recorded.
pub fn remove_payment(book: &LoanBook, payment_id: &str) -> LoanBook {
    let loan_id = match book.payment(payment_id) {
        Some(payment) => payment.loan_id.clone(),
        None => return book.clone(),
    };

    let mut next = book.clone();
    next.payments.retain(|p| p.id != payment_id);
    apply_reconciliation(next, &loan_id, None)
}

// ---------------------------------------------------------------------------
// Borrower records
// ---------------------------------------------------------------------------

/// Add a borrower. No-op when the id is already registered.
pub fn register_borrower(book: &LoanBook, borrower: Borrower) -> LoanBook {
    if book.borrower(&borrower.id).is_some() {
        return book.clone();
    }
    let mut next = book.clone();
    next.borrowers.push(borrower);
    next
}

/// Replace a borrower's profile. The stored score is kept: only payment
/// events move a score. No-op when the id is unknown.
pub fn amend_borrower(book: &LoanBook, updated: Borrower) -> LoanBook {
    let pos = match book.borrowers.iter().position(|b| b.id == updated.id) {
        Some(pos) => pos,
        None => return book.clone(),
    };

    let mut next = book.clone();
    let score = next.borrowers[pos].score;
    next.borrowers[pos] = Borrower { score, ..updated };
    next
}

/// Remove a borrower together with all their loans and those loans'
/// payments. Unknown ids are a no-op.
pub fn remove_borrower(book: &LoanBook, borrower_id: &str) -> LoanBook {
    let mut next = book.clone();
    next.borrowers.retain(|b| b.id != borrower_id);

    let removed_loans: Vec<String> = next
        .loans
        .iter()
        .filter(|l| l.borrower_id == borrower_id)
        .map(|l| l.id.clone())
        .collect();
    next.loans.retain(|l| l.borrower_id != borrower_id);
    next.payments.retain(|p| !removed_loans.contains(&p.loan_id));

    next
}

// ---------------------------------------------------------------------------
// Loan records
// ---------------------------------------------------------------------------

/// Add a loan. No-ops when the borrower is unknown or the loan id is
/// already taken.
pub fn originate_loan(book: &LoanBook, loan: Loan) -> LoanBook {
    if book.borrower(&loan.borrower_id).is_none() || book.loan(&loan.id).is_some() {
        return book.clone();
    }
    let mut next = book.clone();
    next.loans.push(loan);
    next
}

/// Replace a loan record (typically built via [`Loan::amend_terms`]) and
/// reconcile it against the existing payments. No-ops when the loan id or
/// the new borrower id is unknown.
pub fn amend_loan(book: &LoanBook, updated: Loan) -> LoanBook {
    if book.borrower(&updated.borrower_id).is_none() {
        return book.clone();
    }
    let pos = match book.loans.iter().position(|l| l.id == updated.id) {
        Some(pos) => pos,
        None => return book.clone(),
    };

    let loan_id = updated.id.clone();
    let mut next = book.clone();
    next.loans[pos] = updated;
    apply_reconciliation(next, &loan_id, None)
}

/// Remove a loan and every payment recorded against it. Unknown ids are a
/// no-op.
pub fn remove_loan(book: &LoanBook, loan_id: &str) -> LoanBook {
    let mut next = book.clone();
    next.loans.retain(|l| l.id != loan_id);
    next.payments.retain(|p| p.loan_id != loan_id);
    next
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
