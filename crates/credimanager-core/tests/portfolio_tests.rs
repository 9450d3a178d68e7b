use chrono::NaiveDate;
use credimanager_core::advisory::{self, RiskAdvisor};
use credimanager_core::delinquency::ArrearsSeverity;
use credimanager_core::portfolio;
use credimanager_core::reconcile;
use credimanager_core::seed;
use credimanager_core::types::{Borrower, Loan, LoanBook, LoanStatus, Payment, PaymentKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn payment(id: &str, loan_id: &str, amount: Decimal, on: NaiveDate) -> Payment {
    Payment::new(id, loan_id, amount, on, PaymentKind::Total, None).unwrap()
}

/// A book exercising every classification at once, as of 2024-03-20:
///
/// - l-current: due 2024-04-10, three weeks out.
/// - l-upcoming: due 2024-03-25, inside the reminder window.
/// - l-late-minor: due 2024-03-15, 5 days late.
/// - l-late-critical: due 2024-02-10, 39 days late.
/// - l-settled: fully repaid.
fn mixed_book() -> LoanBook {
    let mut book = LoanBook::default();
    book = reconcile::register_borrower(
        &book,
        Borrower::register("b-1", "Ana Souza", "123.456.789-00", "555-0100", "ana@example.com", "12 Main St"),
    );
    book = reconcile::register_borrower(
        &book,
        Borrower::register("b-2", "Bruno Lima", "987.654.321-00", "555-0200", "bruno@example.com", "7th Ave"),
    );

    book = reconcile::originate_loan(
        &book,
        Loan::originate("l-current", "b-1", dec!(1200), Decimal::ZERO, 12, date(2024, 3, 10)).unwrap(),
    );
    book = reconcile::originate_loan(
        &book,
        Loan::originate("l-upcoming", "b-1", dec!(600), Decimal::ZERO, 6, date(2024, 2, 25)).unwrap(),
    );
    book = reconcile::originate_loan(
        &book,
        Loan::originate("l-late-minor", "b-2", dec!(300), Decimal::ZERO, 3, date(2024, 2, 15)).unwrap(),
    );
    book = reconcile::originate_loan(
        &book,
        Loan::originate("l-late-critical", "b-2", dec!(400), Decimal::ZERO, 4, date(2024, 1, 10)).unwrap(),
    );
    book = reconcile::originate_loan(
        &book,
        Loan::originate("l-settled", "b-1", dec!(200), Decimal::ZERO, 2, date(2024, 1, 1)).unwrap(),
    );
    reconcile::record_payment(&book, payment("p-settle", "l-settled", dec!(200), date(2024, 1, 20)))
}

fn today() -> NaiveDate {
    date(2024, 3, 20)
}

// ===========================================================================
// Agenda
// ===========================================================================

#[test]
fn test_agenda_lists_only_window_hits() {
    let book = mixed_book();
    let agenda = portfolio::payment_agenda(&book, today());

    assert_eq!(agenda.len(), 1);
    assert_eq!(agenda[0].loan_id, "l-upcoming");
    assert_eq!(agenda[0].due_date, date(2024, 3, 25));
    assert_eq!(agenda[0].days_until_due, 5);
    assert_eq!(agenda[0].installment_amount, dec!(100));
    assert_eq!(agenda[0].borrower_name, "Ana Souza");
}

#[test]
fn test_agenda_includes_due_today_at_zero_days() {
    let book = mixed_book();
    let agenda = portfolio::payment_agenda(&book, date(2024, 3, 25));
    let entry = agenda.iter().find(|e| e.loan_id == "l-upcoming").unwrap();
    assert_eq!(entry.days_until_due, 0);
}

#[test]
fn test_agenda_follows_covered_installments() {
    // Paying the first l-upcoming installment pushes its due date to
    // 2024-04-25, so on 2024-04-05 only l-current (due 2024-04-10) is left
    // in the window.
    let book = mixed_book();
    let book = reconcile::record_payment(&book, payment("p-up", "l-upcoming", dec!(100), date(2024, 3, 25)));
    let agenda = portfolio::payment_agenda(&book, date(2024, 4, 5));

    let ids: Vec<&str> = agenda.iter().map(|e| e.loan_id.as_str()).collect();
    assert_eq!(ids, vec!["l-current"]);
    assert_eq!(agenda[0].days_until_due, 5);
}

// ===========================================================================
// Arrears
// ===========================================================================

#[test]
fn test_arrears_report_sorts_and_buckets() {
    let book = mixed_book();
    let report = portfolio::arrears_report(&book, today());

    let ids: Vec<&str> = report.iter().map(|e| e.loan_id.as_str()).collect();
    assert_eq!(ids, vec!["l-late-critical", "l-late-minor"]);

    assert_eq!(report[0].days_late, 39);
    assert_eq!(report[0].severity, ArrearsSeverity::Critical);
    assert_eq!(report[0].borrower_name, "Bruno Lima");
    assert_eq!(report[0].remaining_balance, dec!(400));

    assert_eq!(report[1].days_late, 5);
    assert_eq!(report[1].severity, ArrearsSeverity::Minor);
}

#[test]
fn test_settled_loans_never_reach_the_arrears_report() {
    let book = mixed_book();
    // Years later, the settled loan still does not show up.
    let report = portfolio::arrears_report(&book, date(2030, 1, 1));
    assert!(report.iter().all(|e| e.loan_id != "l-settled"));
    assert_eq!(report.len(), 4);
}

// ===========================================================================
// Summary
// ===========================================================================

#[test]
fn test_summary_over_the_mixed_book() {
    let book = mixed_book();
    let summary = portfolio::portfolio_summary(&book, today());

    assert_eq!(summary.borrower_count, 2);
    assert_eq!(summary.loan_count, 5);
    assert_eq!(summary.payment_count, 1);
    assert_eq!(summary.principal_invested, dec!(2700));
    // 1200 + 600 + 300 + 400 outstanding; the settled loan contributes zero.
    assert_eq!(summary.total_outstanding, dec!(2500));
    assert_eq!(summary.active_loans, 4);
    assert_eq!(summary.settled_loans, 1);
    assert_eq!(summary.overdue_loans, 2);
    assert_eq!(summary.upcoming_loans, 1);
    // Interest-free book: nothing projected, nothing realized.
    assert_eq!(summary.projected_interest, Decimal::ZERO);
    assert_eq!(summary.realized_interest, Decimal::ZERO);

    let split = &summary.receivables;
    assert_eq!(split.current_outstanding, dec!(1800));
    assert_eq!(split.overdue_outstanding, dec!(700));
    assert_eq!(split.settled_inflow, dec!(200));
    assert_eq!(split.total_volume, dec!(2700));
    let share_sum = split.current_share + split.overdue_share + split.settled_share;
    assert!((share_sum - Decimal::ONE).abs() < dec!(0.0000001));
}

#[test]
fn test_summary_reflects_reconciliation_after_events() {
    let mut book = mixed_book();
    let before = portfolio::portfolio_summary(&book, today());

    // Clearing the critical loan moves its balance out of overdue.
    book = reconcile::record_payment(&book, payment("p-clear", "l-late-critical", dec!(400), date(2024, 3, 20)));
    let after = portfolio::portfolio_summary(&book, today());

    assert_eq!(after.overdue_loans, before.overdue_loans - 1);
    assert_eq!(after.settled_loans, before.settled_loans + 1);
    assert_eq!(after.receivables.overdue_outstanding, dec!(300));
    assert_eq!(after.total_outstanding, before.total_outstanding - dec!(400));
}

// ===========================================================================
// Advisory
// ===========================================================================

struct EchoAdvisor;

impl RiskAdvisor for EchoAdvisor {
    fn assess(&self, dossier: &str) -> Result<String, String> {
        Ok(format!("reviewed {} characters", dossier.len()))
    }
}

struct DownAdvisor;

impl RiskAdvisor for DownAdvisor {
    fn assess(&self, _dossier: &str) -> Result<String, String> {
        Err("upstream timeout".to_string())
    }
}

#[test]
fn test_advisory_runs_over_book_records() {
    let book = mixed_book();
    let borrower = book.borrower("b-2").unwrap();

    let dossier = advisory::risk_dossier(borrower, &book.loans);
    assert!(dossier.contains("Bruno Lima"));
    assert!(dossier.contains("Internal score: 50/100"));
    // Only b-2's two loans are listed.
    assert_eq!(dossier.matches("- Amount:").count(), 2);

    let opinion = advisory::assess_with(&EchoAdvisor, borrower, &book.loans);
    assert!(opinion.starts_with("reviewed "));
}

#[test]
fn test_advisory_failure_is_contained() {
    let book = mixed_book();
    let before = book.clone();
    let borrower = book.borrower("b-1").unwrap();

    let opinion = advisory::assess_with(&DownAdvisor, borrower, &book.loans);
    assert_eq!(opinion, advisory::ADVISORY_UNAVAILABLE);

    // Advisory output never feeds back into state.
    assert_eq!(before.to_json().unwrap(), book.to_json().unwrap());
}

// ===========================================================================
// Seed book
// ===========================================================================

#[test]
fn test_seed_book_reports_cleanly() {
    let book = seed::seed_book();
    let summary = portfolio::portfolio_summary(&book, date(2025, 4, 1));

    assert_eq!(summary.borrower_count, 2);
    assert_eq!(summary.loan_count, 3);
    assert!(summary.total_outstanding > Decimal::ZERO);
    assert!(summary.projected_interest > Decimal::ZERO);

    // Two of the three seed loans carry interest, so the projection exceeds
    // what has been realized so far.
    assert!(summary.projected_interest > summary.realized_interest);
}

#[test]
fn test_seed_loans_have_priceable_terms() {
    let book = seed::seed_book();
    for loan in &book.loans {
        assert!(loan.installment_amount().is_ok());
        assert_eq!(loan.status, LoanStatus::Active);
    }
}
