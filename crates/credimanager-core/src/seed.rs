//! Built-in starter book used when no snapshot exists yet.
//!
//! The records are created through the same operations the engine exposes,
//! so every derived field (balances, statuses, scores) is consistent with
//! the recorded payments rather than hand-written.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::reconcile;
use crate::types::{Borrower, EmergencyContact, Loan, LoanBook, Payment, PaymentKind};

/// A small but fully-populated book: two borrowers, three loans with mixed
/// terms and a short payment history.
pub fn seed_book() -> LoanBook {
    let mut book = LoanBook::default();

    let mut ana = Borrower::register(
        "b-seed-01",
        "Ana Souza",
        "123.456.789-00",
        "+55 11 98765-0001",
        "ana.souza@example.com",
        "Rua das Flores 120, Sao Paulo",
    );
    ana.emergency_contacts.push(EmergencyContact {
        name: "Paulo Souza".to_string(),
        relation: "brother".to_string(),
        phone: "+55 11 98765-0002".to_string(),
    });
    book = reconcile::register_borrower(&book, ana);

    let mut bruno = Borrower::register(
        "b-seed-02",
        "Bruno Lima",
        "987.654.321-00",
        "+55 21 97654-0003",
        "bruno.lima@example.com",
        "Av. Atlantica 55, Rio de Janeiro",
    );
    bruno.notes = Some("Referred by Ana Souza.".to_string());
    book = reconcile::register_borrower(&book, bruno);

    book = seed_loan(book, "ln-seed-01", "b-seed-01", dec!(1200), Decimal::ZERO, 12, ymd(2025, 1, 10));
    book = seed_loan(book, "ln-seed-02", "b-seed-01", dec!(500), dec!(0.05), 5, ymd(2025, 3, 1));
    book = seed_loan(book, "ln-seed-03", "b-seed-02", dec!(2000), dec!(0.03), 10, ymd(2025, 2, 15));

    book = seed_payment(book, "pay-seed-01", "ln-seed-01", dec!(100), ymd(2025, 2, 10));
    book = seed_payment(book, "pay-seed-02", "ln-seed-01", dec!(100), ymd(2025, 3, 8));
    book = seed_payment(book, "pay-seed-03", "ln-seed-03", dec!(240), ymd(2025, 3, 20));

    book
}

fn seed_loan(
    book: LoanBook,
    id: &str,
    borrower_id: &str,
    principal: Decimal,
    rate: Decimal,
    installments: u32,
    start_date: NaiveDate,
) -> LoanBook {
    match Loan::originate(id, borrower_id, principal, rate, installments, start_date) {
        Ok(loan) => reconcile::originate_loan(&book, loan),
        Err(_) => book,
    }
}

fn seed_payment(book: LoanBook, id: &str, loan_id: &str, amount: Decimal, on: NaiveDate) -> LoanBook {
    match Payment::new(id, loan_id, amount, on, PaymentKind::Total, None) {
        Ok(payment) => reconcile::record_payment(&book, payment),
        Err(_) => book,
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
