//! CSV serialization of a yearly tax summary
//!
//! Layout: a header row, one data row per capital gain record (disposal date
//! ascending), a summary footer, and an appendix listing the year's raw
//! transactions. Numbers are written as plain `1234.56` strings so the file
//! re-parses identically regardless of locale; monetary values are rounded
//! to 2 decimal places here and nowhere earlier.

use anyhow::Context;
use csv::WriterBuilder;

use crate::error::Result;
use crate::ledger::Transaction;
use crate::tax::TaxSummary;
use crate::utils::round2;

pub const GAINS_HEADER: [&str; 7] = [
    "Date",
    "Asset",
    "Amount",
    "Proceeds",
    "Cost Basis",
    "Gain/Loss",
    "Term",
];

/// Serialize a tax summary (plus the ledger it came from) to CSV text.
///
/// `transactions` is the same ledger the summary was generated from; only
/// the rows dated in the summary's year appear in the appendix.
pub fn generate_csv_report(summary: &TaxSummary, transactions: &[Transaction]) -> Result<String> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(GAINS_HEADER)?;
    for record in &summary.capital_gains {
        writer.write_record([
            record.date.date_naive().to_string(),
            record.asset.clone(),
            record.amount.to_string(),
            money(record.proceeds),
            money(record.cost_basis),
            money(record.gain),
            term_label(record.is_long_term).to_string(),
        ])?;
    }

    writer.write_record([""])?;
    writer.write_record(["SUMMARY", &summary.year.to_string()])?;
    writer.write_record(["Method", summary.method.as_str()])?;
    writer.write_record(["Short-term gains", &money(summary.short_term_gains)])?;
    writer.write_record(["Short-term losses", &money(summary.short_term_losses)])?;
    writer.write_record(["Long-term gains", &money(summary.long_term_gains)])?;
    writer.write_record(["Long-term losses", &money(summary.long_term_losses)])?;
    writer.write_record(["Total gains", &money(summary.total_gains)])?;
    writer.write_record(["Total losses", &money(summary.total_losses)])?;
    writer.write_record(["Net gain", &money(summary.net_gain)])?;
    writer.write_record(["Total fees", &money(summary.total_fees)])?;
    writer.write_record(["Transactions", &summary.transaction_count.to_string()])?;
    writer.write_record(["Assets", &summary.assets.join(";")])?;

    let mut year_txs: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.year() == summary.year)
        .collect();
    year_txs.sort_by_key(|tx| tx.date);

    writer.write_record([""])?;
    writer.write_record(["TRANSACTIONS"])?;
    writer.write_record(["Date", "Id", "Type", "Asset", "Amount", "Price", "Fee"])?;
    for tx in year_txs {
        writer.write_record([
            tx.date.date_naive().to_string(),
            tx.id.clone(),
            tx.transaction_type.as_str().to_string(),
            tx.asset.clone(),
            tx.amount.to_string(),
            money(tx.price),
            money(tx.fee),
        ])?;
    }

    let bytes = writer.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

fn money(value: rust_decimal::Decimal) -> String {
    format!("{:.2}", round2(value))
}

fn term_label(is_long_term: bool) -> &'static str {
    if is_long_term {
        "long"
    } else {
        "short"
    }
}
