//! Domain records for the lending book.
//!
//! Covers:
//! 1. **Borrower** -- identity, contact profile and the 0-100 behaviour score.
//! 2. **Loan** -- contract terms plus the derived balance fields kept in
//!    lockstep by [`crate::reconcile`].
//! 3. **Payment** -- a dated amount applied against one loan.
//! 4. **LoanBook** -- the immutable state snapshot every operation reads from
//!    and returns a successor of.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::schedule;
use crate::score;
use crate::LendingResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as monthly decimals (0.05 = 5% per month). Never as percentages.
pub type Rate = Decimal;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Persisted lifecycle state of a loan.
///
/// Only the balance rule in [`LoanStatus::settle`] moves a loan between
/// `Active` and `Paid`. `Overdue` is a display-time classification (see
/// [`crate::delinquency`]) and is never written by reconciliation itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    #[default]
    Active,
    Overdue,
    Paid,
}

impl LoanStatus {
    /// Balance-driven status transition: a zero balance settles the loan,
    /// a settled loan whose balance climbs back above zero reverts to
    /// `Active`, and any other status is kept as-is.
    pub fn settle(self, remaining_balance: Money) -> LoanStatus {
        if remaining_balance.is_zero() {
            LoanStatus::Paid
        } else if self == LoanStatus::Paid {
            LoanStatus::Active
        } else {
            self
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "Active"),
            LoanStatus::Overdue => write!(f, "Overdue"),
            LoanStatus::Paid => write!(f, "Paid"),
        }
    }
}

/// How a payment is classified against the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    Interest,
    Principal,
    #[default]
    Total,
}

impl std::fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentKind::Interest => write!(f, "Interest"),
            PaymentKind::Principal => write!(f, "Principal"),
            PaymentKind::Total => write!(f, "Total"),
        }
    }
}

// ---------------------------------------------------------------------------
// Borrower
// ---------------------------------------------------------------------------

/// A person to call when the borrower cannot be reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub relation: String,
    pub phone: String,
}

/// A registered client of the lending book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrower {
    pub id: String,
    pub name: String,
    /// Government-issued identity number (e.g. a CPF or SSN).
    pub national_id: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Behaviour score on the closed 0-100 scale. New borrowers start at
    /// [`score::INITIAL_SCORE`]; only payment events move it afterwards.
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Borrower {
    /// Register a new borrower with the neutral starting score and an empty
    /// contact list.
    pub fn register(
        id: impl Into<String>,
        name: impl Into<String>,
        national_id: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Borrower {
        Borrower {
            id: id.into(),
            name: name.into(),
            national_id: national_id.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
            emergency_contacts: Vec::new(),
            score: score::INITIAL_SCORE,
            notes: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

/// A fixed-installment loan contract plus its derived balance fields.
///
/// `total_paid`, `accrued_interest`, `remaining_balance` and `status` are
/// derived: construct loans through [`Loan::originate`] and keep them
/// consistent through [`crate::reconcile`], never by hand-editing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub borrower_id: String,
    /// Amount disbursed at origination.
    pub principal_amount: Money,
    /// Flat monthly rate as a decimal (0.05 = 5% per month).
    pub monthly_rate: Rate,
    /// Number of equal installments. Always at least 1.
    pub installments: u32,
    /// Contract date; the first installment falls due one calendar month later.
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    /// Sum of all payment amounts recorded against this loan.
    pub total_paid: Money,
    /// Total interest the contract will generate, fixed at origination:
    /// installment x count - principal.
    pub accrued_interest: Money,
    /// Outstanding portion of the total contract value, floored at zero.
    pub remaining_balance: Money,
}

impl Loan {
    /// Create a loan from its contract terms, computing the derived fields
    /// for a contract with no payments yet.
    ///
    /// Fails with [`LendingError::InvalidInput`] when the terms do not
    /// describe a computable schedule (non-positive principal, zero
    /// installments or a negative rate).
    pub fn originate(
        id: impl Into<String>,
        borrower_id: impl Into<String>,
        principal_amount: Money,
        monthly_rate: Rate,
        installments: u32,
        start_date: NaiveDate,
    ) -> LendingResult<Loan> {
        let contract_value =
            schedule::total_contract_value(principal_amount, monthly_rate, installments)?;
        Ok(Loan {
            id: id.into(),
            borrower_id: borrower_id.into(),
            principal_amount,
            monthly_rate,
            installments,
            start_date,
            status: LoanStatus::Active,
            total_paid: Decimal::ZERO,
            accrued_interest: contract_value - principal_amount,
            remaining_balance: contract_value,
        })
    }

    /// Rewrite the contract terms of an existing loan, keeping its payment
    /// history. Derived fields are recomputed against the recorded
    /// `total_paid`; the balance is floored at zero and the status follows
    /// [`LoanStatus::settle`].
    pub fn amend_terms(
        &self,
        principal_amount: Money,
        monthly_rate: Rate,
        installments: u32,
        start_date: NaiveDate,
    ) -> LendingResult<Loan> {
        let contract_value =
            schedule::total_contract_value(principal_amount, monthly_rate, installments)?;
        let remaining_balance = (contract_value - self.total_paid).max(Decimal::ZERO);
        Ok(Loan {
            principal_amount,
            monthly_rate,
            installments,
            start_date,
            status: self.status.settle(remaining_balance),
            accrued_interest: contract_value - principal_amount,
            remaining_balance,
            ..self.clone()
        })
    }

    /// Principal plus the interest fixed at origination.
    pub fn total_contract_value(&self) -> Money {
        self.principal_amount + self.accrued_interest
    }

    /// The fixed installment amount for this loan's terms.
    pub fn installment_amount(&self) -> LendingResult<Money> {
        schedule::installment_amount(self.principal_amount, self.monthly_rate, self.installments)
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// A single payment applied against one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub loan_id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub kind: PaymentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payment {
    /// Create a payment record. The amount must be strictly positive.
    pub fn new(
        id: impl Into<String>,
        loan_id: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        kind: PaymentKind,
        notes: Option<String>,
    ) -> LendingResult<Payment> {
        if amount <= Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: "amount".to_string(),
                reason: "payment amount must be positive".to_string(),
            });
        }
        Ok(Payment {
            id: id.into(),
            loan_id: loan_id.into(),
            amount,
            date,
            kind,
            notes,
        })
    }
}

// ---------------------------------------------------------------------------
// LoanBook
// ---------------------------------------------------------------------------

/// The full state snapshot: every borrower, loan and payment.
///
/// Operations in [`crate::reconcile`] take a book by reference and return a
/// new one; nothing mutates a snapshot in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanBook {
    pub borrowers: Vec<Borrower>,
    pub loans: Vec<Loan>,
    pub payments: Vec<Payment>,
}

impl LoanBook {
    pub fn borrower(&self, id: &str) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.id == id)
    }

    pub fn loan(&self, id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub fn payment(&self, id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    /// Loans belonging to one borrower, in book order.
    pub fn loans_for(&self, borrower_id: &str) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.borrower_id == borrower_id)
            .collect()
    }

    /// Payments applied against one loan, in book order.
    pub fn payments_for(&self, loan_id: &str) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|p| p.loan_id == loan_id)
            .collect()
    }

    /// Serialize the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> LendingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot produced by [`LoanBook::to_json`].
    pub fn from_json(raw: &str) -> LendingResult<LoanBook> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
