//! Ledger normalizer
//!
//! Coerces raw transaction-like records into canonical [`Transaction`]s,
//! collecting all per-record issues instead of failing on the first error.
//! Rejected records are enumerated next to the accepted ones so the caller
//! can surface them to the user; a strict all-or-nothing mode is available
//! for callers that prefer to abort the whole batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::error::LedgerError;
use crate::ledger::models::{RawTransaction, Transaction, TransactionType};

/// A raw record the normalizer refused, with the reason
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    pub id: String,
    pub error: LedgerError,
}

/// Result of lenient normalization: accepted transactions plus all rejects
#[derive(Debug, Default)]
pub struct NormalizedLedger {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRecord>,
}

impl NormalizedLedger {
    pub fn has_rejects(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Normalize a batch of raw records, rejecting per record.
///
/// A failed record never corrupts the rest of the batch; it is excluded and
/// reported in `rejected` with the offending transaction id.
pub fn normalize_transactions(raw: Vec<RawTransaction>) -> NormalizedLedger {
    let mut out = NormalizedLedger::default();

    for record in raw {
        match normalize_record(record) {
            Ok(tx) => out.transactions.push(tx),
            Err(error) => {
                warn!(id = %error.transaction_id().unwrap_or("?"), %error, "rejected ledger record");
                out.rejected.push(RejectedRecord {
                    id: error.transaction_id().unwrap_or_default().to_string(),
                    error,
                });
            }
        }
    }

    out
}

/// All-or-nothing normalization: the first invalid record fails the batch.
pub fn normalize_strict(raw: Vec<RawTransaction>) -> Result<Vec<Transaction>, LedgerError> {
    raw.into_iter().map(normalize_record).collect()
}

fn normalize_record(raw: RawTransaction) -> Result<Transaction, LedgerError> {
    let date = parse_date(&raw.date).ok_or_else(|| LedgerError::MalformedDate {
        id: raw.id.clone(),
        value: raw.date.clone(),
    })?;

    let transaction_type = TransactionType::from_str(&raw.transaction_type).map_err(|_| {
        LedgerError::InvalidTransactionType {
            id: raw.id.clone(),
            value: raw.transaction_type.clone(),
        }
    })?;

    if raw.amount <= Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            id: raw.id,
            field: "amount",
            expected: "positive",
            value: raw.amount,
        });
    }
    if raw.price < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            id: raw.id,
            field: "price",
            expected: "non-negative",
            value: raw.price,
        });
    }
    if raw.fee < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount {
            id: raw.id,
            field: "fee",
            expected: "non-negative",
            value: raw.fee,
        });
    }

    // A supplied value is authoritative; the effective unit price is
    // recomputed from it when the two disagree.
    let value = raw.value.unwrap_or(raw.amount * raw.price);
    let price = if value == raw.amount * raw.price {
        raw.price
    } else {
        value / raw.amount
    };

    Ok(Transaction {
        id: raw.id,
        date,
        transaction_type,
        asset: raw.asset.trim().to_ascii_uppercase(),
        amount: raw.amount,
        price,
        value,
        fee: raw.fee,
        tag: raw.tag,
    })
}

/// Accepts plain dates, naive datetimes and RFC 3339 timestamps
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
