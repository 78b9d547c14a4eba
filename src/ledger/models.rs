use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger event types recognized by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
    Swap,
    Stake,
    Unstake,
    Reward,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
            TransactionType::TransferIn => "transfer_in",
            TransactionType::TransferOut => "transfer_out",
            TransactionType::Swap => "swap",
            TransactionType::Stake => "stake",
            TransactionType::Unstake => "unstake",
            TransactionType::Reward => "reward",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            "transfer_in" | "deposit" => Ok(TransactionType::TransferIn),
            "transfer_out" | "withdrawal" => Ok(TransactionType::TransferOut),
            "swap" => Ok(TransactionType::Swap),
            "stake" => Ok(TransactionType::Stake),
            "unstake" => Ok(TransactionType::Unstake),
            "reward" | "staking_reward" => Ok(TransactionType::Reward),
            _ => Err(()),
        }
    }
}

/// Canonical ledger transaction, produced by the normalizer.
///
/// `value` is authoritative for the reporting-currency worth of the event;
/// `price` is the effective per-unit price (`value / amount`) after
/// reconciliation. All derived records are recomputed from these on every
/// report request; nothing is persisted by the engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub transaction_type: TransactionType,
    pub asset: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub value: Decimal,
    pub fee: Decimal,
    /// Free-form marker, e.g. "airdrop" on reward transactions
    pub tag: Option<String>,
}

impl Transaction {
    /// Tax year this transaction falls into
    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.date.year()
    }

    pub fn is_airdrop(&self) -> bool {
        self.transaction_type == TransactionType::Reward
            && self
                .tag
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("airdrop"))
    }
}

/// Raw transaction as it arrives from a caller-owned source (UI state,
/// file import, API response). Fields are loosely typed on purpose; the
/// normalizer coerces or rejects them per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    /// Date string: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339
    pub date: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub asset: String,
    pub amount: Decimal,
    pub price: Decimal,
    /// Reporting-currency value; authoritative over `amount * price` when set
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub tag: Option<String>,
}
