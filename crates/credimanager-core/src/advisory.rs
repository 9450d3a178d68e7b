//! Borrower risk-advisory dossier.
//!
//! The engine assembles the analyst brief; the transport that answers it
//! (an external language-model service in the reference deployment) is
//! injected through [`RiskAdvisor`]. Advisory output is informational only
//! and never feeds back into scores, balances or statuses, so a failed
//! lookup degrades to a fixed message instead of an error.

use crate::types::{Borrower, Loan};

/// Fixed user-facing text when the advisory lookup fails or comes back empty.
pub const ADVISORY_UNAVAILABLE: &str =
    "Risk assessment is unavailable right now. Try again later.";

/// An external service that turns a dossier into a free-text risk opinion.
pub trait RiskAdvisor {
    /// Answer the dossier, or describe why the lookup failed. The error
    /// text is for the host's own diagnostics; callers of
    /// [`assess_with`] only ever see [`ADVISORY_UNAVAILABLE`].
    fn assess(&self, dossier: &str) -> Result<String, String>;
}

/// Build the analyst brief for one borrower from their profile and loan
/// history. Loans belonging to other borrowers are ignored.
pub fn risk_dossier(borrower: &Borrower, loans: &[Loan]) -> String {
    let mut text = String::new();

    text.push_str("Act as a senior credit analyst.\n");
    text.push_str("Review the following client and their history and provide a technical risk opinion.\n\n");
    text.push_str(&format!("Client: {}\n", borrower.name));
    text.push_str(&format!("Internal score: {}/100\n", borrower.score));
    text.push_str(&format!("National ID: {}\n", borrower.national_id));
    text.push_str(&format!(
        "Emergency contacts on file: {}\n\n",
        borrower.emergency_contacts.len()
    ));
    text.push_str("Loan history:\n");
    for loan in loans.iter().filter(|l| l.borrower_id == borrower.id) {
        text.push_str(&format!(
            "- Amount: {}, Status: {}, Outstanding: {}\n",
            loan.principal_amount, loan.status, loan.remaining_balance
        ));
    }
    text.push_str(
        "\nProvide a summary in 3 paragraphs covering reliability and a suggested future credit limit.\n",
    );

    text
}

/// Run the advisor over the borrower's dossier. Failures and empty answers
/// collapse to [`ADVISORY_UNAVAILABLE`]; this function never errors.
pub fn assess_with<A: RiskAdvisor>(advisor: &A, borrower: &Borrower, loans: &[Loan]) -> String {
    let dossier = risk_dossier(borrower, loans);
    match advisor.assess(&dossier) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => ADVISORY_UNAVAILABLE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct CannedAdvisor(Result<String, String>);

    impl RiskAdvisor for CannedAdvisor {
        fn assess(&self, _dossier: &str) -> Result<String, String> {
            self.0.clone()
        }
    }

    fn sample_borrower() -> Borrower {
        Borrower::register("b-1", "Ana Souza", "123.456.789-00", "555-0100", "ana@example.com", "12 Main St")
    }

    fn sample_loans() -> Vec<Loan> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        vec![
            Loan::originate("l-1", "b-1", dec!(1200), Decimal::ZERO, 12, start).unwrap(),
            Loan::originate("l-2", "b-other", dec!(999), Decimal::ZERO, 9, start).unwrap(),
        ]
    }

    #[test]
    fn test_dossier_contains_profile_and_own_loans_only() {
        let dossier = risk_dossier(&sample_borrower(), &sample_loans());
        assert!(dossier.contains("Client: Ana Souza"));
        assert!(dossier.contains("Internal score: 50/100"));
        assert!(dossier.contains("Emergency contacts on file: 0"));
        assert!(dossier.contains("Amount: 1200"));
        assert!(!dossier.contains("999"));
    }

    #[test]
    fn test_assess_passes_through_answer() {
        let advisor = CannedAdvisor(Ok("Looks reliable.".to_string()));
        let opinion = assess_with(&advisor, &sample_borrower(), &sample_loans());
        assert_eq!(opinion, "Looks reliable.");
    }

    #[test]
    fn test_assess_swallows_failures() {
        let advisor = CannedAdvisor(Err("socket closed".to_string()));
        let opinion = assess_with(&advisor, &sample_borrower(), &sample_loans());
        assert_eq!(opinion, ADVISORY_UNAVAILABLE);
    }

    #[test]
    fn test_assess_treats_blank_answer_as_unavailable() {
        let advisor = CannedAdvisor(Ok("  \n".to_string()));
        let opinion = assess_with(&advisor, &sample_borrower(), &sample_loans());
        assert_eq!(opinion, ADVISORY_UNAVAILABLE);
    }
}
