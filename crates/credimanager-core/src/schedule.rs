//! Fixed-installment amortization math and the due-date calendar.
//!
//! Covers:
//! 1. **Installment amount (PMT)** -- the standard annuity formula, with a
//!    straight principal split when the rate is zero.
//! 2. **Total contract value** -- installment x count, the figure the
//!    borrower ultimately repays.
//! 3. **Coverage** -- how many whole installments the amounts paid so far
//!    add up to.
//! 4. **Due dates** -- one calendar month apart from the contract start,
//!    with the day-of-month clamped to the target month's length
//!    (Jan 31 + 1 month = Feb 28, or Feb 29 in leap years).
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LendingError;
use crate::types::{Money, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Installment math
// ---------------------------------------------------------------------------

/// Fixed installment for a principal repaid over `installments` equal
/// monthly payments at a flat monthly `rate`.
///
/// Zero-rate contracts split the principal evenly; otherwise the annuity
/// formula `P * r(1+r)^n / ((1+r)^n - 1)` applies.
pub fn installment_amount(
    principal: Money,
    monthly_rate: Rate,
    installments: u32,
) -> LendingResult<Money> {
    validate_terms(principal, monthly_rate, installments)?;

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(installments));
    }

    let one_plus_r = Decimal::ONE + monthly_rate;
    let factor = one_plus_r.powd(Decimal::from(installments));
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LendingError::DivisionByZero {
            context: "installment annuity factor".into(),
        });
    }

    Ok(principal * monthly_rate * factor / denominator)
}

/// Everything the borrower will pay over the life of the contract:
/// the fixed installment times the number of installments.
pub fn total_contract_value(
    principal: Money,
    monthly_rate: Rate,
    installments: u32,
) -> LendingResult<Money> {
    let installment = installment_amount(principal, monthly_rate, installments)?;
    Ok(installment * Decimal::from(installments))
}

/// Number of whole installments the amounts paid so far cover:
/// `floor(total_paid / installment)`. Partial installments do not count,
/// and overpayment past the schedule end is not capped.
pub fn installments_covered(total_paid: Money, installment: Money) -> u32 {
    if installment <= Decimal::ZERO || total_paid < installment {
        return 0;
    }
    (total_paid / installment)
        .floor()
        .min(Decimal::from(u32::MAX))
        .to_u32()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Due-date calendar
// ---------------------------------------------------------------------------

/// Due date of the next uncovered installment: `installments_covered + 1`
/// whole calendar months after the contract start, in a single jump.
pub fn next_due_date(start_date: NaiveDate, installments_covered: u32) -> NaiveDate {
    add_months(start_date, installments_covered.saturating_add(1))
}

/// The full due-date calendar for a contract, one entry per installment.
pub fn due_dates(start_date: NaiveDate, installments: u32) -> Vec<NaiveDate> {
    (1..=installments).map(|k| add_months(start_date, k)).collect()
}

/// Add a number of months to a date, clamping the day to the month's max.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months =
        i64::from(date.year()) * 12 + i64::from(date.month()) - 1 + i64::from(months);
    let new_year = match i32::try_from(total_months.div_euclid(12)) {
        Ok(year) => year,
        Err(_) => return date,
    };
    let new_month = (total_months.rem_euclid(12) + 1) as u32;
    let max_day = days_in_month(new_year, new_month);
    let day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, day).unwrap_or(date)
}

/// Number of days in a given month/year.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(principal: Money, monthly_rate: Rate, installments: u32) -> LendingResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "principal_amount".into(),
            reason: "principal must be positive".into(),
        });
    }
    if installments == 0 {
        return Err(LendingError::InvalidInput {
            field: "installments".into(),
            reason: "installment count must be at least 1".into(),
        });
    }
    if monthly_rate < Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "monthly_rate".into(),
            reason: "rate must not be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_installment_zero_rate_splits_principal() {
        let pmt = installment_amount(dec!(1000), Decimal::ZERO, 10).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_installment_annuity_formula() {
        // 1000 at 5%/month over 12 months: PMT = 112.8254...
        let pmt = installment_amount(dec!(1000), dec!(0.05), 12).unwrap();
        assert!(approx_eq(pmt, dec!(112.8254), dec!(0.001)));
    }

    #[test]
    fn test_installment_single_period() {
        // One installment at 10%: the whole principal plus one month of interest.
        let pmt = installment_amount(dec!(1000), dec!(0.10), 1).unwrap();
        assert!(approx_eq(pmt, dec!(1100), dec!(0.0001)));
    }

    #[test]
    fn test_installment_rejects_invalid_terms() {
        assert!(installment_amount(Decimal::ZERO, dec!(0.05), 12).is_err());
        assert!(installment_amount(dec!(-100), dec!(0.05), 12).is_err());
        assert!(installment_amount(dec!(1000), dec!(0.05), 0).is_err());
        assert!(installment_amount(dec!(1000), dec!(-0.05), 12).is_err());
    }

    #[test]
    fn test_total_contract_value_zero_rate() {
        assert_eq!(total_contract_value(dec!(1200), Decimal::ZERO, 12).unwrap(), dec!(1200));
    }

    #[test]
    fn test_total_contract_value_exceeds_principal_with_interest() {
        let tcv = total_contract_value(dec!(1000), dec!(0.05), 12).unwrap();
        assert!(tcv > dec!(1000));
        assert!(approx_eq(tcv, dec!(1353.9048), dec!(0.01)));
    }

    #[test]
    fn test_installments_covered_floors() {
        assert_eq!(installments_covered(dec!(0), dec!(100)), 0);
        assert_eq!(installments_covered(dec!(99.99), dec!(100)), 0);
        assert_eq!(installments_covered(dec!(100), dec!(100)), 1);
        assert_eq!(installments_covered(dec!(250), dec!(100)), 2);
        assert_eq!(installments_covered(dec!(1200), dec!(100)), 12);
    }

    #[test]
    fn test_installments_covered_ignores_bad_installment() {
        assert_eq!(installments_covered(dec!(500), Decimal::ZERO), 0);
        assert_eq!(installments_covered(dec!(500), dec!(-1)), 0);
    }

    #[test]
    fn test_next_due_date_advances_per_covered() {
        let start = date(2024, 1, 1);
        assert_eq!(next_due_date(start, 0), date(2024, 2, 1));
        assert_eq!(next_due_date(start, 1), date(2024, 3, 1));
        assert_eq!(next_due_date(start, 11), date(2025, 1, 1));
    }

    #[test]
    fn test_next_due_date_clamps_month_end() {
        assert_eq!(next_due_date(date(2024, 1, 31), 0), date(2024, 2, 29));
        assert_eq!(next_due_date(date(2023, 1, 31), 0), date(2023, 2, 28));
        assert_eq!(next_due_date(date(2024, 8, 31), 0), date(2024, 9, 30));
        // The clamp happens per jump, not cumulatively: 3 months from Jan 31
        // lands on Apr 30, not Apr 28.
        assert_eq!(next_due_date(date(2024, 1, 31), 2), date(2024, 4, 30));
    }

    #[test]
    fn test_next_due_date_crosses_year_boundary() {
        assert_eq!(next_due_date(date(2024, 11, 15), 1), date(2025, 1, 15));
        assert_eq!(next_due_date(date(2024, 12, 31), 0), date(2025, 1, 31));
    }

    #[test]
    fn test_due_dates_full_calendar() {
        let dates = due_dates(date(2024, 1, 31), 3);
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_due_dates_length_matches_installments() {
        assert_eq!(due_dates(date(2024, 1, 1), 12).len(), 12);
        assert!(due_dates(date(2024, 1, 1), 0).is_empty());
    }

    #[test]
    fn test_leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }
}
