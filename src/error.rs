//! Error handling for gainledger
//!
//! Defines the record-level error taxonomy for ledger validation and the
//! cost-basis engine, and establishes a unified Result type using anyhow
//! for context chaining and error propagation.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by normalization and the cost-basis engine.
///
/// Validation errors always name the offending transaction id so the caller
/// can surface the record to the user instead of aborting the whole batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("transaction {id}: malformed date '{value}'")]
    MalformedDate { id: String, value: String },

    #[error("transaction {id}: {field} must be {expected}, got {value}")]
    NegativeAmount {
        id: String,
        field: &'static str,
        expected: &'static str,
        value: Decimal,
    },

    #[error("transaction {id}: unknown transaction type '{value}'")]
    InvalidTransactionType { id: String, value: String },

    #[error("insufficient lot inventory for {asset}: disposing {requested} with only {available} acquired")]
    InsufficientLotInventory {
        asset: String,
        requested: Decimal,
        available: Decimal,
    },

    #[error("cost basis method {0} is not implemented")]
    UnsupportedCostBasisMethod(String),
}

impl LedgerError {
    /// Transaction id the error is attributable to, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            LedgerError::MalformedDate { id, .. }
            | LedgerError::NegativeAmount { id, .. }
            | LedgerError::InvalidTransactionType { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for ledger operations
pub type Result<T> = anyhow::Result<T>;
