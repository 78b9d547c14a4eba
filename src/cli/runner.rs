//! Command dispatch and terminal rendering for the CLI

use anyhow::{bail, Context, Result};
use colored::Colorize;
use itertools::Itertools;
use std::str::FromStr;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use gainledger::importers;
use gainledger::ledger::{normalize_transactions, NormalizedLedger};
use gainledger::reports::generate_csv_report;
use gainledger::tax::{
    calculate_capital_gains, calculate_wash_sales, generate_yearly_tax_report, CapitalGainRecord,
    CostBasisMethod, TaxSettings, WashSaleRecord,
};
use gainledger::utils::format_currency;

use crate::cli::{Cli, Commands};

pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Report {
            ref file,
            year,
            ref method,
            export,
        } => {
            let settings = settings_for(method)?;
            let ledger = load_ledger(file, cli.json)?;
            let summary = generate_yearly_tax_report(&ledger.transactions, year, &settings)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_gains_table(&summary.capital_gains);
                println!();
                println!("{} Tax summary {} ({})", "✓".green().bold(), year, settings.cost_basis_method);
                println!(
                    "  Short-term:   {} gains / {} losses",
                    format_currency(summary.short_term_gains),
                    format_currency(summary.short_term_losses)
                );
                println!(
                    "  Long-term:    {} gains / {} losses",
                    format_currency(summary.long_term_gains),
                    format_currency(summary.long_term_losses)
                );
                println!("  Net gain:     {}", format_currency(summary.net_gain).bold());
                println!("  Total fees:   {}", format_currency(summary.total_fees));
                println!(
                    "  Transactions: {} across {}",
                    summary.transaction_count,
                    summary.assets.iter().join(", ")
                );
                println!(
                    "  Est. tax:     {}",
                    format_currency(summary.estimated_tax(&settings.tax_rate))
                );
            }

            if export {
                let path = format!("tax_report_{}.csv", year);
                let csv = generate_csv_report(&summary, &ledger.transactions)?;
                std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path))?;
                println!("\n{} Exported to {}", "✓".green().bold(), path);
            }

            Ok(())
        }

        Commands::Gains { ref file, ref method } => {
            let settings = settings_for(method)?;
            let ledger = load_ledger(file, cli.json)?;
            let records = calculate_capital_gains(&ledger.transactions, &settings)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_gains_table(&records);
            }
            Ok(())
        }

        Commands::WashSales { ref file } => {
            let ledger = load_ledger(file, cli.json)?;
            let records = calculate_wash_sales(&ledger.transactions, &TaxSettings::default())?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("{} No wash sales detected", "✓".green().bold());
            } else {
                print_wash_sale_table(&records);
                println!(
                    "\n{} {} wash sale(s); losses disallowed for tax purposes",
                    "⚠".yellow().bold(),
                    records.len()
                );
            }
            Ok(())
        }

        Commands::Check { ref file } => {
            let ledger = load_ledger(file, cli.json)?;
            if cli.json {
                let rejects: Vec<_> = ledger
                    .rejected
                    .iter()
                    .map(|r| serde_json::json!({ "id": r.id, "error": r.error.to_string() }))
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "accepted": ledger.transactions.len(),
                        "rejected": rejects,
                    }))?
                );
            } else {
                println!(
                    "{} {} transaction(s) accepted",
                    "✓".green().bold(),
                    ledger.transactions.len()
                );
                for reject in &ledger.rejected {
                    println!("  {} {}", "✗".red(), reject.error);
                }
            }
            Ok(())
        }
    }
}

/// Load a ledger file and normalize it, reporting rejects on stderr
fn load_ledger(file: &str, quiet: bool) -> Result<NormalizedLedger> {
    let raw = importers::import_file(file)?;
    info!("loaded {} raw records from {}", raw.len(), file);

    let ledger = normalize_transactions(raw);
    if ledger.has_rejects() && !quiet {
        eprintln!(
            "{} {} record(s) rejected during normalization:",
            "⚠".yellow().bold(),
            ledger.rejected.len()
        );
        for reject in &ledger.rejected {
            eprintln!("  {} {}", "✗".red(), reject.error);
        }
    }
    Ok(ledger)
}

fn settings_for(method: &str) -> Result<TaxSettings> {
    let Ok(method) = CostBasisMethod::from_str(method) else {
        bail!("unknown cost basis method '{}'. Supported: FIFO, LIFO", method);
    };
    Ok(TaxSettings::with_method(method))
}

fn print_gains_table(records: &[CapitalGainRecord]) {
    #[derive(Tabled)]
    struct GainRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Asset")]
        asset: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Proceeds")]
        proceeds: String,
        #[tabled(rename = "Cost Basis")]
        cost_basis: String,
        #[tabled(rename = "Gain/Loss")]
        gain: String,
        #[tabled(rename = "Term")]
        term: String,
    }

    let rows: Vec<GainRow> = records
        .iter()
        .map(|r| GainRow {
            date: r.date.date_naive().to_string(),
            asset: r.asset.clone(),
            amount: r.amount.to_string(),
            proceeds: format_currency(r.proceeds),
            cost_basis: format_currency(r.cost_basis),
            gain: format_currency(r.gain),
            term: if r.is_long_term { "long" } else { "short" }.to_string(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

fn print_wash_sale_table(records: &[WashSaleRecord]) {
    #[derive(Tabled)]
    struct WashRow {
        #[tabled(rename = "Asset")]
        asset: String,
        #[tabled(rename = "Loss Sale")]
        loss: String,
        #[tabled(rename = "Repurchase")]
        repurchase: String,
        #[tabled(rename = "Loss")]
        loss_amount: String,
        #[tabled(rename = "Disallowed")]
        disallowed: String,
    }

    let rows: Vec<WashRow> = records
        .iter()
        .map(|r| WashRow {
            asset: r.asset.clone(),
            loss: format!("{} ({})", r.loss_date.date_naive(), r.loss_transaction_id),
            repurchase: format!(
                "{} ({})",
                r.repurchase_date.date_naive(),
                r.repurchase_transaction_id
            ),
            loss_amount: format_currency(r.loss_amount),
            disallowed: format_currency(r.wash_sale_amount),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}
