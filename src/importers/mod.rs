// Import module - JSON and CSV ledger parsers

pub mod csv_ledger;
pub mod json_ledger;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

use crate::ledger::RawTransaction;

/// Import raw transactions from a ledger file (auto-detects JSON vs CSV)
pub fn import_file<P: AsRef<Path>>(file_path: P) -> Result<Vec<RawTransaction>> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    info!("Importing ledger file: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "json" => json_ledger::parse_json_ledger(path),
        "csv" => csv_ledger::parse_csv_ledger(path),
        _ => Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .json, .csv",
            extension
        )),
    }
}
