pub mod borrower;
pub mod loan;
pub mod payment;
pub mod report;
