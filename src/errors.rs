use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the ledger engine.
///
/// Every guard in the mutation layer evaluates fully before any state is
/// written, so a returned error always means the ledger is unchanged.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed; the caller should re-prompt.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The operation collides with existing data but may proceed once the
    /// user explicitly confirms it.
    #[error("confirmation required: {0}")]
    Conflict(String),
    /// The operation would break a protected invariant. Blocking; the only
    /// way forward is a different request.
    #[error("operation not allowed: {0}")]
    InvariantViolation(String),
    /// A goal contribution exceeds the source account balance.
    #[error("insufficient funds: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },
    /// A referenced entity no longer exists; the caller should refresh its view.
    #[error("{0} not found")]
    NotFound(String),
    /// Persistence failure outside the core's control.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = StdResult<T, LedgerError>;

impl LedgerError {
    /// Shortfall reported to the user for a rejected goal contribution.
    pub fn shortfall(&self) -> Option<f64> {
        match self {
            LedgerError::InsufficientFunds {
                requested,
                available,
            } => Some(requested - available),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}
