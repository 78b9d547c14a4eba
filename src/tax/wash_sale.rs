//! Wash-sale detector
//!
//! Scans each asset's timeline for loss sales with a repurchase inside the
//! 61-day window centered on the sale (30 days either side, mirroring the US
//! rule). The detector is advisory only: it reports disallowed losses but
//! never feeds a basis adjustment back into the lot matcher. That is a known
//! simplification of the full US rule, kept on purpose.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{Transaction, TransactionType};
use crate::tax::cost_basis::calculate_capital_gains;
use crate::tax::settings::TaxSettings;

/// Days on either side of a loss sale that a repurchase taints
pub const WASH_SALE_WINDOW_DAYS: i64 = 30;

/// A loss sale with a qualifying repurchase inside the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WashSaleRecord {
    pub asset: String,
    pub loss_transaction_id: String,
    pub loss_date: DateTime<Utc>,
    pub repurchase_transaction_id: String,
    pub repurchase_date: DateTime<Utc>,
    /// Absolute realized loss on the sale
    pub loss_amount: Decimal,
    /// Disallowed portion: the loss prorated by repurchase/sale quantity
    pub wash_sale_amount: Decimal,
}

/// Detect wash sales across the normalized ledger.
///
/// Emits at most one record per loss sale: the nearest qualifying repurchase
/// by day distance wins, ties broken toward the earlier repurchase. Results
/// are ordered by loss-sale date ascending.
pub fn calculate_wash_sales(
    transactions: &[Transaction],
    settings: &TaxSettings,
) -> Result<Vec<WashSaleRecord>, LedgerError> {
    let gains = calculate_capital_gains(transactions, settings)?;

    // Net realized result per disposal transaction
    let mut net_by_disposal: HashMap<&str, Decimal> = HashMap::new();
    for record in &gains {
        *net_by_disposal.entry(record.disposal_id.as_str()).or_default() += record.gain;
    }

    let mut loss_sales: Vec<(&Transaction, Decimal)> = transactions
        .iter()
        .filter(|tx| tx.transaction_type == TransactionType::Sell)
        .filter_map(|tx| {
            let net = *net_by_disposal.get(tx.id.as_str())?;
            (net < Decimal::ZERO).then(|| (tx, net.abs()))
        })
        .collect();
    loss_sales.sort_by_key(|(tx, _)| tx.date);

    let mut records = Vec::new();
    for (sale, loss) in loss_sales {
        let Some(repurchase) = nearest_repurchase(transactions, sale) else {
            continue;
        };

        let coverage = (repurchase.amount / sale.amount).min(Decimal::ONE);
        records.push(WashSaleRecord {
            asset: sale.asset.clone(),
            loss_transaction_id: sale.id.clone(),
            loss_date: sale.date,
            repurchase_transaction_id: repurchase.id.clone(),
            repurchase_date: repurchase.date,
            loss_amount: loss,
            wash_sale_amount: loss * coverage,
        });
    }

    Ok(records)
}

fn nearest_repurchase<'a>(
    transactions: &'a [Transaction],
    sale: &Transaction,
) -> Option<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| {
            tx.transaction_type == TransactionType::Buy
                && tx.asset == sale.asset
                && day_distance(tx, sale) <= WASH_SALE_WINDOW_DAYS
        })
        .min_by_key(|tx| (day_distance(tx, sale), tx.date))
}

fn day_distance(a: &Transaction, b: &Transaction) -> i64 {
    (a.date.date_naive() - b.date.date_naive()).num_days().abs()
}
