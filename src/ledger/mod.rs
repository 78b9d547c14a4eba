// Ledger module - canonical transaction model and input normalization

pub mod models;
pub mod normalize;

pub use models::{RawTransaction, Transaction, TransactionType};
pub use normalize::{normalize_strict, normalize_transactions, NormalizedLedger, RejectedRecord};
