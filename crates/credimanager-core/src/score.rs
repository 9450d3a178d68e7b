//! Borrower behaviour score adjustments.
//!
//! Covers:
//! 1. **Timing delta** -- maps how early or late a payment landed relative
//!    to its installment due date onto a small score adjustment.
//! 2. **Clamped application** -- folds a delta into the running 0-100 score
//!    without ever leaving the scale.
//!
//! Deltas judge calendar timing only; the paid amount never matters here.

use chrono::NaiveDate;

/// Score assigned to a borrower before any payment history exists.
pub const INITIAL_SCORE: u8 = 50;

/// Upper bound of the score scale. The lower bound is zero.
pub const MAX_SCORE: u8 = 100;

/// Days past the due date that carry no penalty.
pub const GRACE_DAYS: i64 = 7;

/// Days past the due date before the heavier penalty kicks in.
pub const LATE_DAYS: i64 = 15;

/// Score adjustment for a payment dated `payment_date` against an
/// installment falling due on `due_date`.
///
/// Early payments earn +2, on-the-day payments +1, anything within the
/// seven-day grace window 0, days 8 through 15 cost -1 and later costs -2.
pub fn timing_delta(due_date: NaiveDate, payment_date: NaiveDate) -> i8 {
    let diff_days = (payment_date - due_date).num_days();

    if diff_days < 0 {
        2
    } else if diff_days == 0 {
        1
    } else if diff_days <= GRACE_DAYS {
        0
    } else if diff_days <= LATE_DAYS {
        -1
    } else {
        -2
    }
}

/// Fold a delta into a score, clamping to the closed 0-100 scale.
pub fn apply_delta(score: u8, delta: i8) -> u8 {
    (i16::from(score) + i16::from(delta)).clamp(0, i16::from(MAX_SCORE)) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
