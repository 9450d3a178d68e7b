//! Portfolio-wide reporting over a book snapshot.
//!
//! Covers:
//! 1. **Payment agenda** -- installments due inside the reminder window,
//!    soonest first.
//! 2. **Arrears report** -- every overdue installment, most days late first.
//! 3. **Portfolio summary** -- invested principal, outstanding balances,
//!    realized and projected interest, status counts and the receivables
//!    split used for the status breakdown.
//!
//! All functions are read-only views: they never change loan status or any
//! other persisted field. Loans whose stored terms cannot be priced are
//! left out of the date-driven listings and grouped with current
//! receivables in the summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::delinquency::{self, ArrearsSeverity, Delinquency, LoanStanding};
use crate::types::{Loan, LoanBook, LoanStatus, Money, Rate};

// ---------------------------------------------------------------------------
// Report rows
// ---------------------------------------------------------------------------

/// One reminder row: an installment falling due within the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaEntry {
    pub loan_id: String,
    pub borrower_id: String,
    pub borrower_name: String,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub installment_amount: Money,
}

/// One arrears row: an installment past its due date on a non-settled loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrearsEntry {
    pub loan_id: String,
    pub borrower_id: String,
    pub borrower_name: String,
    pub due_date: NaiveDate,
    pub days_late: i64,
    pub severity: ArrearsSeverity,
    pub installment_amount: Money,
    pub remaining_balance: Money,
    pub borrower_score: u8,
}

/// Receivables grouped by where they stand today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivablesSplit {
    /// Outstanding balances on loans that are on schedule.
    pub current_outstanding: Money,
    /// Outstanding balances on loans past a due date.
    pub overdue_outstanding: Money,
    /// Money already collected on settled loans.
    pub settled_inflow: Money,
    /// Sum of the three buckets.
    pub total_volume: Money,
    /// Bucket shares of `total_volume`, as decimals (zero when the book is empty).
    pub current_share: Rate,
    pub overdue_share: Rate,
    pub settled_share: Rate,
}

/// The headline numbers for the whole book on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub borrower_count: usize,
    pub loan_count: usize,
    pub payment_count: usize,
    /// Principal disbursed across all loans.
    pub principal_invested: Money,
    /// Outstanding contract value across all loans.
    pub total_outstanding: Money,
    /// Interest already collected, prorated by how much of each contract is paid.
    pub realized_interest: Money,
    /// Interest the full contracts will generate if repaid to term.
    pub projected_interest: Money,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub settled_loans: usize,
    /// Loans with an installment due inside the reminder window.
    pub upcoming_loans: usize,
    pub receivables: ReceivablesSplit,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn borrower_name(book: &LoanBook, borrower_id: &str) -> String {
    book.borrower(borrower_id)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn standings<'a>(
    book: &'a LoanBook,
    today: NaiveDate,
) -> impl Iterator<Item = (&'a Loan, LoanStanding)> + 'a {
    book.loans
        .iter()
        .filter_map(move |loan| delinquency::loan_standing(loan, today).ok().map(|s| (loan, s)))
}

/// Installments due inside the reminder window on active loans, ordered
/// soonest first.
pub fn payment_agenda(book: &LoanBook, today: NaiveDate) -> Vec<AgendaEntry> {
    let mut agenda: Vec<AgendaEntry> = standings(book, today)
        .filter(|(loan, _)| loan.status == LoanStatus::Active)
        .filter_map(|(loan, standing)| match standing.delinquency {
            Delinquency::Upcoming { days_until_due } => Some(AgendaEntry {
                loan_id: loan.id.clone(),
                borrower_id: loan.borrower_id.clone(),
                borrower_name: borrower_name(book, &loan.borrower_id),
                due_date: standing.next_due_date,
                days_until_due,
                installment_amount: standing.installment_amount,
            }),
            _ => None,
        })
        .collect();

    agenda.sort_by_key(|entry| entry.days_until_due);
    agenda
}

/// Every loan past a due date, ordered deepest in arrears first.
pub fn arrears_report(book: &LoanBook, today: NaiveDate) -> Vec<ArrearsEntry> {
    let mut report: Vec<ArrearsEntry> = standings(book, today)
        .filter_map(|(loan, standing)| match standing.delinquency {
            Delinquency::Overdue { days_late, severity } => Some(ArrearsEntry {
                loan_id: loan.id.clone(),
                borrower_id: loan.borrower_id.clone(),
                borrower_name: borrower_name(book, &loan.borrower_id),
                due_date: standing.next_due_date,
                days_late,
                severity,
                installment_amount: standing.installment_amount,
                remaining_balance: loan.remaining_balance,
                borrower_score: book
                    .borrower(&loan.borrower_id)
                    .map(|b| b.score)
                    .unwrap_or(0),
            }),
            _ => None,
        })
        .collect();

    report.sort_by(|a, b| b.days_late.cmp(&a.days_late));
    report
}

/// Headline numbers for the whole book.
pub fn portfolio_summary(book: &LoanBook, today: NaiveDate) -> PortfolioSummary {
    let mut principal_invested = Decimal::ZERO;
    let mut total_outstanding = Decimal::ZERO;
    let mut realized_interest = Decimal::ZERO;
    let mut projected_interest = Decimal::ZERO;

    let mut current_outstanding = Decimal::ZERO;
    let mut overdue_outstanding = Decimal::ZERO;
    let mut settled_inflow = Decimal::ZERO;

    let mut overdue_loans = 0;
    let mut upcoming_loans = 0;

    for loan in &book.loans {
        principal_invested += loan.principal_amount;
        total_outstanding += loan.remaining_balance;
        projected_interest += loan.accrued_interest;

        let contract_value = loan.total_contract_value();
        if contract_value > Decimal::ZERO {
            realized_interest += loan.accrued_interest * (loan.total_paid / contract_value);
        }

        let delinquency = delinquency::loan_standing(loan, today)
            .map(|s| s.delinquency)
            .unwrap_or(Delinquency::Current { days_until_due: 0 });
        match delinquency {
            Delinquency::Overdue { .. } => {
                overdue_loans += 1;
                overdue_outstanding += loan.remaining_balance;
            }
            Delinquency::Upcoming { .. } => {
                upcoming_loans += 1;
                current_outstanding += loan.remaining_balance;
            }
            Delinquency::Current { .. } => current_outstanding += loan.remaining_balance,
            Delinquency::Paid => settled_inflow += loan.total_paid,
        }
    }

    let total_volume = current_outstanding + overdue_outstanding + settled_inflow;
    let share = |bucket: Money| {
        if total_volume.is_zero() {
            Decimal::ZERO
        } else {
            bucket / total_volume
        }
    };

    PortfolioSummary {
        borrower_count: book.borrowers.len(),
        loan_count: book.loans.len(),
        payment_count: book.payments.len(),
        principal_invested,
        total_outstanding,
        realized_interest,
        projected_interest,
        active_loans: book.loans.iter().filter(|l| l.status == LoanStatus::Active).count(),
        overdue_loans,
        settled_loans: book.loans.iter().filter(|l| l.status == LoanStatus::Paid).count(),
        upcoming_loans,
        receivables: ReceivablesSplit {
            current_outstanding,
            overdue_outstanding,
            settled_inflow,
            total_volume,
            current_share: share(current_outstanding),
            overdue_share: share(overdue_outstanding),
            settled_share: share(settled_inflow),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile;
    use crate::types::{Borrower, Payment, PaymentKind};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(id: &str, loan_id: &str, amount: Decimal, on: NaiveDate) -> Payment {
        Payment::new(id, loan_id, amount, on, PaymentKind::Total, None).unwrap()
    }

    /// Two borrowers, three interest-free loans with staggered start dates:
    /// l-1 due 2024-02-01, l-2 due 2024-02-05, l-3 due 2024-01-15.
    fn sample_book() -> LoanBook {
        let mut book = LoanBook::default();
        book = reconcile::register_borrower(
            &book,
            Borrower::register("b-1", "Ana Souza", "1", "555", "a@x.c", "12 Main St"),
        );
        book = reconcile::register_borrower(
            &book,
            Borrower::register("b-2", "Bruno Lima", "2", "556", "b@x.c", "7th Ave"),
        );
        book = reconcile::originate_loan(
            &book,
            Loan::originate("l-1", "b-1", dec!(1200), Decimal::ZERO, 12, date(2024, 1, 1)).unwrap(),
        );
        book = reconcile::originate_loan(
            &book,
            Loan::originate("l-2", "b-2", dec!(600), Decimal::ZERO, 6, date(2024, 1, 5)).unwrap(),
        );
        book = reconcile::originate_loan(
            &book,
            Loan::originate("l-3", "b-2", dec!(300), Decimal::ZERO, 3, date(2023, 12, 15)).unwrap(),
        );
        book
    }

    #[test]
    fn test_agenda_filters_to_window_and_sorts_soonest_first() {
        let book = sample_book();
        // 2024-01-30: l-1 due in 2 days, l-2 due in 6, l-3 already 15 days late.
        let agenda = payment_agenda(&book, date(2024, 1, 30));
        let ids: Vec<&str> = agenda.iter().map(|e| e.loan_id.as_str()).collect();
        assert_eq!(ids, vec!["l-1", "l-2"]);
        assert_eq!(agenda[0].days_until_due, 2);
        assert_eq!(agenda[1].days_until_due, 6);
        assert_eq!(agenda[0].borrower_name, "Ana Souza");
        assert_eq!(agenda[0].installment_amount, dec!(100));
    }

    #[test]
    fn test_agenda_skips_settled_loans() {
        let mut book = sample_book();
        book = reconcile::record_payment(&book, payment("p-1", "l-1", dec!(1200), date(2024, 1, 20)));
        let agenda = payment_agenda(&book, date(2024, 1, 30));
        assert!(agenda.iter().all(|e| e.loan_id != "l-1"));
    }

    #[test]
    fn test_arrears_sorts_deepest_first() {
        let book = sample_book();
        // 2024-02-10: l-3 is 26 days late, l-1 is 9, l-2 is 5.
        let report = arrears_report(&book, date(2024, 2, 10));
        let ids: Vec<&str> = report.iter().map(|e| e.loan_id.as_str()).collect();
        assert_eq!(ids, vec!["l-3", "l-1", "l-2"]);
        assert_eq!(report[0].days_late, 26);
        assert_eq!(report[0].severity, ArrearsSeverity::Moderate);
        assert_eq!(report[2].severity, ArrearsSeverity::Minor);
        assert_eq!(report[0].borrower_score, 50);
    }

    #[test]
    fn test_summary_counts_and_buckets() {
        let mut book = sample_book();
        // Settle l-3 entirely; p-2 covers one l-1 installment.
        book = reconcile::record_payment(&book, payment("p-1", "l-3", dec!(300), date(2024, 1, 10)));
        book = reconcile::record_payment(&book, payment("p-2", "l-1", dec!(100), date(2024, 2, 1)));

        // 2024-02-10: l-1 next due 2024-03-01 (current), l-2 5 days late.
        let summary = portfolio_summary(&book, date(2024, 2, 10));
        assert_eq!(summary.borrower_count, 2);
        assert_eq!(summary.loan_count, 3);
        assert_eq!(summary.payment_count, 2);
        assert_eq!(summary.principal_invested, dec!(2100));
        assert_eq!(summary.total_outstanding, dec!(1700));
        assert_eq!(summary.active_loans, 2);
        assert_eq!(summary.settled_loans, 1);
        assert_eq!(summary.overdue_loans, 1);
        assert_eq!(summary.upcoming_loans, 0);

        let split = &summary.receivables;
        assert_eq!(split.current_outstanding, dec!(1100));
        assert_eq!(split.overdue_outstanding, dec!(600));
        assert_eq!(split.settled_inflow, dec!(300));
        assert_eq!(split.total_volume, dec!(2000));
        assert_eq!(split.current_share, dec!(0.55));
        assert_eq!(split.overdue_share, dec!(0.30));
        assert_eq!(split.settled_share, dec!(0.15));
    }

    #[test]
    fn test_summary_interest_is_prorated_by_paid_share() {
        let mut book = LoanBook::default();
        book = reconcile::register_borrower(
            &book,
            Borrower::register("b-1", "Ana Souza", "1", "555", "a@x.c", "12 Main St"),
        );
        // 1000 at 10% over 2 installments: PMT 576.19..., interest 152.38...
        book = reconcile::originate_loan(
            &book,
            Loan::originate("l-1", "b-1", dec!(1000), dec!(0.10), 2, date(2024, 1, 1)).unwrap(),
        );
        let untouched = portfolio_summary(&book, date(2024, 1, 15));
        assert_eq!(untouched.realized_interest, Decimal::ZERO);
        assert!(untouched.projected_interest > dec!(152.38));

        // Pay half the contract: realized interest is half the projection.
        let half = book.loan("l-1").unwrap().total_contract_value() / dec!(2);
        book = reconcile::record_payment(&book, payment("p-1", "l-1", half, date(2024, 1, 20)));
        let summary = portfolio_summary(&book, date(2024, 1, 21));
        let expected = summary.projected_interest / dec!(2);
        assert!((summary.realized_interest - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_summary_empty_book_has_zero_shares() {
        let summary = portfolio_summary(&LoanBook::default(), date(2024, 1, 1));
        assert_eq!(summary.loan_count, 0);
        assert_eq!(summary.receivables.total_volume, Decimal::ZERO);
        assert_eq!(summary.receivables.current_share, Decimal::ZERO);
    }
}
