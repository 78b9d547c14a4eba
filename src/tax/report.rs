//! Yearly aggregation of capital gain records into a tax summary

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::Transaction;
use crate::tax::cost_basis::{calculate_capital_gains, CapitalGainRecord};
use crate::tax::settings::{CostBasisMethod, TaxRates, TaxSettings};

/// Per-year tax summary for one cost-basis method.
///
/// Gains and losses are split by holding period and kept as positive
/// magnitudes; `net_gain` carries the sign. Monetary fields hold full
/// precision, rounding is a presentation concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSummary {
    pub year: i32,
    pub method: CostBasisMethod,
    pub short_term_gains: Decimal,
    pub short_term_losses: Decimal,
    pub long_term_gains: Decimal,
    pub long_term_losses: Decimal,
    pub total_gains: Decimal,
    pub total_losses: Decimal,
    pub net_gain: Decimal,
    /// Fees across all of the year's transactions, acquisitions included
    pub total_fees: Decimal,
    /// Count of raw ledger transactions dated in the year
    pub transaction_count: usize,
    /// Distinct asset symbols touched in the year, sorted
    pub assets: Vec<String>,
    /// The year's gain records, disposal date ascending
    pub capital_gains: Vec<CapitalGainRecord>,
}

impl TaxSummary {
    /// Estimated tax from the caller's pass-through rates: each term's net
    /// gain, clamped at zero, times its rate.
    pub fn estimated_tax(&self, rates: &TaxRates) -> Decimal {
        let short_net = (self.short_term_gains - self.short_term_losses).max(Decimal::ZERO);
        let long_net = (self.long_term_gains - self.long_term_losses).max(Decimal::ZERO);
        short_net * rates.short_term + long_net * rates.long_term
    }
}

/// Run the lot matcher over the full ledger and aggregate the records whose
/// disposal date falls inside the target year.
///
/// Lots may well have been acquired in earlier years; only the disposal date
/// decides which year a record belongs to, so no record is ever counted in
/// two years.
pub fn generate_yearly_tax_report(
    transactions: &[Transaction],
    year: i32,
    settings: &TaxSettings,
) -> Result<TaxSummary, LedgerError> {
    let all_records = calculate_capital_gains(transactions, settings)?;
    let capital_gains: Vec<CapitalGainRecord> = all_records
        .into_iter()
        .filter(|r| r.year() == year)
        .collect();

    let mut short_term_gains = Decimal::ZERO;
    let mut short_term_losses = Decimal::ZERO;
    let mut long_term_gains = Decimal::ZERO;
    let mut long_term_losses = Decimal::ZERO;

    for record in &capital_gains {
        match (record.is_long_term, record.gain >= Decimal::ZERO) {
            (false, true) => short_term_gains += record.gain,
            (false, false) => short_term_losses += record.gain.abs(),
            (true, true) => long_term_gains += record.gain,
            (true, false) => long_term_losses += record.gain.abs(),
        }
    }

    let year_txs: Vec<&Transaction> = transactions.iter().filter(|tx| tx.year() == year).collect();
    let total_fees = year_txs.iter().map(|tx| tx.fee).sum();
    let assets: BTreeSet<String> = year_txs.iter().map(|tx| tx.asset.clone()).collect();

    let total_gains = short_term_gains + long_term_gains;
    let total_losses = short_term_losses + long_term_losses;

    Ok(TaxSummary {
        year,
        method: settings.cost_basis_method,
        short_term_gains,
        short_term_losses,
        long_term_gains,
        long_term_losses,
        total_gains,
        total_losses,
        net_gain: total_gains - total_losses,
        total_fees,
        transaction_count: year_txs.len(),
        assets: assets.into_iter().collect(),
        capital_gains,
    })
}
