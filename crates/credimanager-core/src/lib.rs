pub mod advisory;
pub mod delinquency;
pub mod error;
pub mod portfolio;
pub mod reconcile;
pub mod schedule;
pub mod score;
pub mod seed;
pub mod types;

pub use error::LendingError;
pub use types::*;

/// Standard result type for all credimanager operations
pub type LendingResult<T> = Result<T, LendingError>;
