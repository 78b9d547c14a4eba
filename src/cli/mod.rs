use clap::{Parser, Subcommand};

pub mod runner;

#[derive(Parser)]
#[command(name = "gainledger")]
#[command(
    version,
    about = "Cryptocurrency capital gains and tax reporting"
)]
#[command(
    long_about = "Compute cost basis (FIFO/LIFO), capital gains, wash sales and yearly tax summaries from a wallet ledger exported as JSON or CSV."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a yearly tax report
    Report {
        /// Path to the ledger file (.json or .csv)
        file: String,

        /// Tax year (e.g., 2023)
        year: i32,

        /// Cost basis method (FIFO or LIFO)
        #[arg(short, long, default_value = "FIFO")]
        method: String,

        /// Export report to CSV (tax_report_<year>.csv)
        #[arg(long)]
        export: bool,
    },

    /// List every capital gain record across the ledger
    Gains {
        /// Path to the ledger file (.json or .csv)
        file: String,

        /// Cost basis method (FIFO or LIFO)
        #[arg(short, long, default_value = "FIFO")]
        method: String,
    },

    /// Detect wash sales across the ledger
    WashSales {
        /// Path to the ledger file (.json or .csv)
        file: String,
    },

    /// Validate a ledger file and list rejected records
    Check {
        /// Path to the ledger file (.json or .csv)
        file: String,
    },
}
