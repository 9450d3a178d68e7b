//! Due-date proximity classification.
//!
//! Covers:
//! 1. **Day distances** -- whole-day gaps between today and the next due
//!    date, in both directions.
//! 2. **Classification** -- Paid / Current / Upcoming / Overdue, with the
//!    seven-day reminder window treated as closed on both ends.
//! 3. **Arrears severity** -- the 1-7 / 8-30 / 31+ day buckets.
//! 4. **Loan standing** -- the derived per-loan view (installment, coverage,
//!    next due date, classification) that reports are built from.
//!
//! Classification is display-time only: nothing here writes back into a
//! loan's persisted status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule;
use crate::types::{Loan, LoanStatus, Money};
use crate::LendingResult;

/// Closed window, in days before the due date, that counts as "upcoming".
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// Last day of arrears still classed as minor.
pub const MINOR_ARREARS_MAX_DAYS: i64 = 7;

/// Last day of arrears still classed as moderate; beyond lies critical.
pub const MODERATE_ARREARS_MAX_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Day distances
// ---------------------------------------------------------------------------

/// Whole days from `today` until `next_due_date`; negative once the date
/// has passed.
pub fn days_until_due(next_due_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_due_date - today).num_days()
}

/// Whole days `today` sits past `next_due_date`, floored at zero.
pub fn days_late(next_due_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - next_due_date).num_days().max(0)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// How deep into arrears an overdue installment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrearsSeverity {
    /// 1 to 7 days late.
    Minor,
    /// 8 to 30 days late.
    Moderate,
    /// More than 30 days late.
    Critical,
}

impl std::fmt::Display for ArrearsSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrearsSeverity::Minor => write!(f, "Minor"),
            ArrearsSeverity::Moderate => write!(f, "Moderate"),
            ArrearsSeverity::Critical => write!(f, "Critical"),
        }
    }
}

/// Bucket a positive `days_late` count into a severity band.
pub fn arrears_severity(days_late: i64) -> ArrearsSeverity {
    if days_late <= MINOR_ARREARS_MAX_DAYS {
        ArrearsSeverity::Minor
    } else if days_late <= MODERATE_ARREARS_MAX_DAYS {
        ArrearsSeverity::Moderate
    } else {
        ArrearsSeverity::Critical
    }
}

/// Where a loan stands relative to its next due date.
///
/// Settled loans are never classified further; an installment due today is
/// `Upcoming` with zero days to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Delinquency {
    Paid,
    Current { days_until_due: i64 },
    Upcoming { days_until_due: i64 },
    Overdue { days_late: i64, severity: ArrearsSeverity },
}

impl Delinquency {
    pub fn is_overdue(&self) -> bool {
        matches!(self, Delinquency::Overdue { .. })
    }

    pub fn is_due_today(&self) -> bool {
        matches!(self, Delinquency::Upcoming { days_until_due: 0 })
    }
}

impl std::fmt::Display for Delinquency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delinquency::Paid => write!(f, "Paid"),
            Delinquency::Current { .. } => write!(f, "Current"),
            Delinquency::Upcoming { .. } => write!(f, "Upcoming"),
            Delinquency::Overdue { .. } => write!(f, "Overdue"),
        }
    }
}

/// Classify a loan's standing from its persisted status and next due date.
pub fn classify(status: LoanStatus, next_due_date: NaiveDate, today: NaiveDate) -> Delinquency {
    if status == LoanStatus::Paid {
        return Delinquency::Paid;
    }

    let late = days_late(next_due_date, today);
    if late >= 1 {
        return Delinquency::Overdue {
            days_late: late,
            severity: arrears_severity(late),
        };
    }

    let until = days_until_due(next_due_date, today);
    if until <= REMINDER_WINDOW_DAYS {
        Delinquency::Upcoming { days_until_due: until }
    } else {
        Delinquency::Current { days_until_due: until }
    }
}

// ---------------------------------------------------------------------------
// Loan standing
// ---------------------------------------------------------------------------

/// The derived view of one loan on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanStanding {
    pub installment_amount: Money,
    pub installments_covered: u32,
    pub next_due_date: NaiveDate,
    pub delinquency: Delinquency,
}

/// Derive a loan's standing: its fixed installment, how many installments
/// the paid total covers, the resulting next due date and the
/// classification against `today`.
pub fn loan_standing(loan: &Loan, today: NaiveDate) -> LendingResult<LoanStanding> {
    let installment_amount = loan.installment_amount()?;
    let installments_covered = schedule::installments_covered(loan.total_paid, installment_amount);
    let next_due_date = schedule::next_due_date(loan.start_date, installments_covered);

    Ok(LoanStanding {
        installment_amount,
        installments_covered,
        next_due_date,
        delinquency: classify(loan.status, next_due_date, today),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_distances() {
        assert_eq!(days_until_due(date(2024, 3, 10), date(2024, 3, 3)), 7);
        assert_eq!(days_until_due(date(2024, 3, 10), date(2024, 3, 12)), -2);
        assert_eq!(days_late(date(2024, 3, 10), date(2024, 3, 12)), 2);
        assert_eq!(days_late(date(2024, 3, 10), date(2024, 3, 8)), 0);
    }

    #[test]
    fn test_classify_current_outside_window() {
        let got = classify(LoanStatus::Active, date(2024, 3, 10), date(2024, 3, 2));
        assert_eq!(got, Delinquency::Current { days_until_due: 8 });
    }

    #[test]
    fn test_classify_window_is_closed_on_both_ends() {
        let got = classify(LoanStatus::Active, date(2024, 3, 10), date(2024, 3, 3));
        assert_eq!(got, Delinquency::Upcoming { days_until_due: 7 });

        let due_today = classify(LoanStatus::Active, date(2024, 3, 10), date(2024, 3, 10));
        assert_eq!(due_today, Delinquency::Upcoming { days_until_due: 0 });
        assert!(due_today.is_due_today());
    }

    #[test]
    fn test_classify_overdue_from_one_day_late() {
        let got = classify(LoanStatus::Active, date(2024, 3, 10), date(2024, 3, 11));
        assert_eq!(
            got,
            Delinquency::Overdue { days_late: 1, severity: ArrearsSeverity::Minor }
        );
    }

    #[test]
    fn test_classify_paid_wins_over_dates() {
        let got = classify(LoanStatus::Paid, date(2020, 1, 1), date(2024, 3, 11));
        assert_eq!(got, Delinquency::Paid);
        assert!(!got.is_overdue());
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(arrears_severity(1), ArrearsSeverity::Minor);
        assert_eq!(arrears_severity(7), ArrearsSeverity::Minor);
        assert_eq!(arrears_severity(8), ArrearsSeverity::Moderate);
        assert_eq!(arrears_severity(30), ArrearsSeverity::Moderate);
        assert_eq!(arrears_severity(31), ArrearsSeverity::Critical);
    }

    #[test]
    fn test_loan_standing_tracks_coverage() {
        let loan = Loan::originate("l-1", "b-1", dec!(1200), Decimal::ZERO, 12, date(2024, 1, 1))
            .unwrap();
        let fresh = loan_standing(&loan, date(2024, 1, 15)).unwrap();
        assert_eq!(fresh.installment_amount, dec!(100));
        assert_eq!(fresh.installments_covered, 0);
        assert_eq!(fresh.next_due_date, date(2024, 2, 1));
        assert_eq!(fresh.delinquency, Delinquency::Current { days_until_due: 17 });

        let part_paid = Loan { total_paid: dec!(250), ..loan };
        let standing = loan_standing(&part_paid, date(2024, 3, 30)).unwrap();
        assert_eq!(standing.installments_covered, 2);
        assert_eq!(standing.next_due_date, date(2024, 4, 1));
        assert_eq!(standing.delinquency, Delinquency::Upcoming { days_until_due: 2 });
    }

    #[test]
    fn test_delinquency_serializes_tagged() {
        let raw = serde_json::to_string(&Delinquency::Upcoming { days_until_due: 3 }).unwrap();
        assert_eq!(raw, "{\"state\":\"UPCOMING\",\"days_until_due\":3}");
    }
}
