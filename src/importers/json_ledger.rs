//! JSON ledger parser
//!
//! Accepts either a bare array of transaction objects or an object with a
//! top-level `transactions` array, which is how wallet exports usually
//! arrive. Field-level validation is the normalizer's job; this only has to
//! produce `RawTransaction`s.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::ledger::RawTransaction;

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerFile {
    Bare(Vec<RawTransaction>),
    Wrapped { transactions: Vec<RawTransaction> },
}

pub fn parse_json_ledger<P: AsRef<Path>>(path: P) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let parsed: LedgerFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse JSON ledger {:?}", path))?;

    Ok(match parsed {
        LedgerFile::Bare(txs) => txs,
        LedgerFile::Wrapped { transactions } => transactions,
    })
}
