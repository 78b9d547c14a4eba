//! CSV ledger parser
//!
//! Expected header: `id,date,type,asset,amount,price,value,fee,tag` with
//! `value`, `fee` and `tag` optional. Empty optional cells deserialize to
//! their defaults; everything else is the normalizer's problem.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

use crate::ledger::RawTransaction;

pub fn parse_csv_ledger<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {:?}", path))?;

    let mut transactions = Vec::new();
    for (row, result) in reader.deserialize::<RawTransaction>().enumerate() {
        let tx = result.with_context(|| format!("failed to parse CSV row {}", row + 2))?;
        transactions.push(tx);
    }

    Ok(transactions)
}
