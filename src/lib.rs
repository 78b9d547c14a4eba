//! Gainledger - cryptocurrency capital gains and tax reporting engine
//!
//! This library normalizes raw wallet ledger transactions, matches disposals
//! against acquisition lots (FIFO or LIFO), classifies holding periods,
//! detects wash sales, and aggregates yearly tax summaries with CSV export.
//! It is a pure in-memory pipeline: the caller owns the transaction source
//! and every report is recomputed from scratch, so calls are reentrant and
//! free of shared state.

pub mod error;
pub mod importers;
pub mod ledger;
pub mod reports;
pub mod tax;
pub mod utils;
