//! Lot matcher (cost-basis engine)
//!
//! Builds per-asset queues of open lots from acquisition transactions and
//! consumes them, oldest- or newest-first, for each disposal. Every consumed
//! lot slice yields one [`CapitalGainRecord`]. The queues are local to each
//! call; nothing is shared between invocations, so report generation is
//! reentrant and safe to run in parallel per year or method.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{Transaction, TransactionType};
use crate::tax::holding_period::is_long_term;
use crate::tax::settings::{CostBasisMethod, TaxSettings};

/// An open slice of a prior acquisition, not yet consumed by a disposal
#[derive(Debug, Clone)]
struct Lot {
    acquired: DateTime<Utc>,
    remaining: Decimal,
    unit_cost: Decimal,
}

/// One disposal slice matched against one lot.
///
/// A disposal transaction produces several records when it spans lots.
/// Monetary fields carry full precision; rounding to 2 decimals happens at
/// presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalGainRecord {
    pub asset: String,
    /// Disposal date
    pub date: DateTime<Utc>,
    /// Acquisition date of the matched lot (disposal date for zero-basis
    /// shortfall slices)
    pub acquired: DateTime<Utc>,
    /// Quantity disposed from this lot
    pub amount: Decimal,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain: Decimal,
    pub is_long_term: bool,
    /// Id of the disposal transaction this slice belongs to
    pub disposal_id: String,
}

impl CapitalGainRecord {
    pub fn year(&self) -> i32 {
        use chrono::Datelike;
        self.date.year()
    }
}

/// How a disposal interacts with the tax report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisposalKind {
    /// Emits capital gain records
    Taxable,
    /// Consumes inventory without emitting records (wallet-internal move)
    Internal,
}

fn acquisition_basis(tx: &Transaction, settings: &TaxSettings) -> Option<Decimal> {
    let included = match tx.transaction_type {
        TransactionType::Buy | TransactionType::TransferIn => true,
        TransactionType::Reward if tx.is_airdrop() => settings.include_airdrops,
        TransactionType::Reward => settings.include_staking_rewards,
        _ => false,
    };
    if !included {
        return None;
    }
    let gross = if settings.include_fees {
        tx.value + tx.fee
    } else {
        tx.value
    };
    Some(gross)
}

fn disposal_kind(tx: &Transaction, settings: &TaxSettings) -> Option<DisposalKind> {
    match tx.transaction_type {
        TransactionType::Sell | TransactionType::Swap => Some(DisposalKind::Taxable),
        TransactionType::TransferOut if settings.taxable_transfers => Some(DisposalKind::Taxable),
        TransactionType::TransferOut => Some(DisposalKind::Internal),
        _ => None,
    }
}

/// Match every disposal in the ledger against prior acquisition lots.
///
/// Transactions are grouped by asset and swept in date order, ledger order
/// breaking ties; that ordering governs both lot creation and consumption.
/// Output records are sorted by disposal date ascending.
pub fn calculate_capital_gains(
    transactions: &[Transaction],
    settings: &TaxSettings,
) -> Result<Vec<CapitalGainRecord>, LedgerError> {
    let consume_newest = match settings.cost_basis_method {
        CostBasisMethod::Fifo => false,
        CostBasisMethod::Lifo => true,
        CostBasisMethod::SpecificId => {
            return Err(LedgerError::UnsupportedCostBasisMethod(
                CostBasisMethod::SpecificId.as_str().to_string(),
            ))
        }
    };

    // BTreeMap keeps cross-asset output deterministic
    let mut by_asset: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        by_asset.entry(tx.asset.as_str()).or_default().push(tx);
    }

    let mut records = Vec::new();
    for (_, mut txs) in by_asset {
        // stable sort: same-date events keep their ledger order
        txs.sort_by_key(|tx| tx.date);

        let mut lots: VecDeque<Lot> = VecDeque::new();
        for tx in txs {
            if let Some(gross) = acquisition_basis(tx, settings) {
                lots.push_back(Lot {
                    acquired: tx.date,
                    remaining: tx.amount,
                    unit_cost: gross / tx.amount,
                });
            } else if let Some(kind) = disposal_kind(tx, settings) {
                consume_lots(&mut lots, tx, kind, consume_newest, settings, &mut records)?;
            }
        }
    }

    records.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(records)
}

fn consume_lots(
    lots: &mut VecDeque<Lot>,
    tx: &Transaction,
    kind: DisposalKind,
    consume_newest: bool,
    settings: &TaxSettings,
    records: &mut Vec<CapitalGainRecord>,
) -> Result<(), LedgerError> {
    if settings.strict_inventory {
        let available: Decimal = lots.iter().map(|l| l.remaining).sum();
        if available < tx.amount {
            return Err(LedgerError::InsufficientLotInventory {
                asset: tx.asset.clone(),
                requested: tx.amount,
                available,
            });
        }
    }

    let mut outstanding = tx.amount;
    while outstanding > Decimal::ZERO {
        let lot = if consume_newest {
            lots.back_mut()
        } else {
            lots.front_mut()
        };

        match lot {
            Some(lot) => {
                let consumed = outstanding.min(lot.remaining);
                if kind == DisposalKind::Taxable {
                    records.push(slice_record(tx, settings, consumed, lot.acquired, lot.unit_cost));
                }
                lot.remaining -= consumed;
                outstanding -= consumed;
                if lot.remaining.is_zero() {
                    if consume_newest {
                        lots.pop_back();
                    } else {
                        lots.pop_front();
                    }
                }
            }
            None => {
                // Open lots exhausted: the shortfall degrades to a
                // zero-cost-basis disposal, full proceeds as gain.
                if kind == DisposalKind::Taxable {
                    records.push(slice_record(tx, settings, outstanding, tx.date, Decimal::ZERO));
                }
                outstanding = Decimal::ZERO;
            }
        }
    }

    Ok(())
}

fn slice_record(
    tx: &Transaction,
    settings: &TaxSettings,
    consumed: Decimal,
    acquired: DateTime<Utc>,
    unit_cost: Decimal,
) -> CapitalGainRecord {
    let fraction = consumed / tx.amount;
    let gross = tx.value * fraction;
    let proceeds = if settings.include_fees {
        gross - tx.fee * fraction
    } else {
        gross
    };
    let cost_basis = unit_cost * consumed;

    CapitalGainRecord {
        asset: tx.asset.clone(),
        date: tx.date,
        acquired,
        amount: consumed,
        proceeds,
        cost_basis,
        gain: proceeds - cost_basis,
        is_long_term: is_long_term(acquired.date_naive(), tx.date.date_naive()),
        disposal_id: tx.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn tx(
        id: &str,
        date: (i32, u32, u32),
        tx_type: TransactionType,
        amount: Decimal,
        price: Decimal,
    ) -> Transaction {
        let (y, m, d) = date;
        Transaction {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            transaction_type: tx_type,
            asset: "BTC".to_string(),
            amount,
            price,
            value: amount * price,
            fee: Decimal::ZERO,
            tag: None,
        }
    }

    fn buy(id: &str, date: (i32, u32, u32), amount: Decimal, price: Decimal) -> Transaction {
        tx(id, date, TransactionType::Buy, amount, price)
    }

    fn sell(id: &str, date: (i32, u32, u32), amount: Decimal, price: Decimal) -> Transaction {
        tx(id, date, TransactionType::Sell, amount, price)
    }

    #[test]
    fn test_fifo_consumes_oldest_lot_first() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            buy("a2", (2023, 2, 1), dec!(10), dec!(2)),
            sell("s1", (2023, 3, 1), dec!(15), dec!(3)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].amount, dec!(10));
        assert_eq!(records[0].cost_basis, dec!(10));
        assert_eq!(records[0].proceeds, dec!(30));
        assert_eq!(records[0].gain, dec!(20));

        assert_eq!(records[1].amount, dec!(5));
        assert_eq!(records[1].cost_basis, dec!(10));
        assert_eq!(records[1].proceeds, dec!(15));
        assert_eq!(records[1].gain, dec!(5));
    }

    #[test]
    fn test_lifo_consumes_newest_lot_first() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            buy("a2", (2023, 2, 1), dec!(10), dec!(2)),
            sell("s1", (2023, 3, 1), dec!(15), dec!(3)),
        ];

        let settings = TaxSettings::with_method(CostBasisMethod::Lifo);
        let records = calculate_capital_gains(&ledger, &settings).unwrap();
        assert_eq!(records.len(), 2);

        // All of the Feb lot first
        assert_eq!(records[0].amount, dec!(10));
        assert_eq!(records[0].cost_basis, dec!(20));
        assert_eq!(records[0].acquired.date_naive().to_string(), "2023-02-01");

        // Then 5 units of the Jan lot
        assert_eq!(records[1].amount, dec!(5));
        assert_eq!(records[1].cost_basis, dec!(5));
        assert_eq!(records[1].acquired.date_naive().to_string(), "2023-01-01");
    }

    #[test]
    fn test_conservation_of_disposed_quantity() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(3), dec!(5)),
            buy("a2", (2023, 1, 2), dec!(4), dec!(6)),
            buy("a3", (2023, 1, 3), dec!(5), dec!(7)),
            sell("s1", (2023, 2, 1), dec!(9.5), dec!(8)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        let total: Decimal = records.iter().map(|r| r.amount).sum();
        assert_eq!(total, dec!(9.5));
    }

    #[test]
    fn test_partial_consumption_leaves_remainder_queued() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            sell("s1", (2023, 2, 1), dec!(4), dec!(2)),
            sell("s2", (2023, 3, 1), dec!(6), dec!(3)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 2);
        // Both sells match the same lot; basis is 1 per unit throughout
        assert_eq!(records[0].cost_basis, dec!(4));
        assert_eq!(records[1].cost_basis, dec!(6));
    }

    #[test]
    fn test_zero_lot_disposal_degrades_to_zero_basis() {
        let ledger = vec![sell("s1", (2023, 2, 1), dec!(2), dec!(100))];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cost_basis, Decimal::ZERO);
        assert_eq!(records[0].gain, records[0].proceeds);
        assert_eq!(records[0].proceeds, dec!(200));
        assert!(!records[0].is_long_term);
    }

    #[test]
    fn test_strict_inventory_mode_errors_on_shortfall() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(1), dec!(10)),
            sell("s1", (2023, 2, 1), dec!(2), dec!(10)),
        ];

        let settings = TaxSettings {
            strict_inventory: true,
            ..TaxSettings::default()
        };
        let err = calculate_capital_gains(&ledger, &settings).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientLotInventory { .. }));
    }

    #[test]
    fn test_specific_id_is_unsupported() {
        let settings = TaxSettings::with_method(CostBasisMethod::SpecificId);
        let err = calculate_capital_gains(&[], &settings).unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnsupportedCostBasisMethod("SPECIFIC_ID".to_string())
        );
    }

    #[test]
    fn test_fees_fold_into_basis_and_proceeds() {
        let mut acquisition = buy("a1", (2023, 1, 1), dec!(10), dec!(10));
        acquisition.fee = dec!(5);
        let mut disposal = sell("s1", (2023, 2, 1), dec!(10), dec!(20));
        disposal.fee = dec!(3);

        let records = calculate_capital_gains(
            &[acquisition.clone(), disposal.clone()],
            &TaxSettings::default(),
        )
        .unwrap();
        // basis (100 + 5), proceeds (200 - 3)
        assert_eq!(records[0].cost_basis, dec!(105));
        assert_eq!(records[0].proceeds, dec!(197));
        assert_eq!(records[0].gain, dec!(92));

        let no_fees = TaxSettings {
            include_fees: false,
            ..TaxSettings::default()
        };
        let records = calculate_capital_gains(&[acquisition, disposal], &no_fees).unwrap();
        assert_eq!(records[0].cost_basis, dec!(100));
        assert_eq!(records[0].proceeds, dec!(200));
    }

    #[test]
    fn test_reward_gating() {
        let mut reward = tx("r1", (2023, 1, 1), TransactionType::Reward, dec!(10), dec!(2));
        reward.tag = None;
        let disposal = sell("s1", (2023, 2, 1), dec!(10), dec!(3));

        let with_rewards = TaxSettings::default();
        let records =
            calculate_capital_gains(&[reward.clone(), disposal.clone()], &with_rewards).unwrap();
        assert_eq!(records[0].cost_basis, dec!(20));

        let without = TaxSettings {
            include_staking_rewards: false,
            ..TaxSettings::default()
        };
        let records = calculate_capital_gains(&[reward, disposal], &without).unwrap();
        // Reward never became a lot: zero-basis disposal
        assert_eq!(records[0].cost_basis, Decimal::ZERO);
    }

    #[test]
    fn test_airdrop_gating_is_independent_of_staking_flag() {
        let mut airdrop = tx("r1", (2023, 1, 1), TransactionType::Reward, dec!(10), dec!(2));
        airdrop.tag = Some("airdrop".to_string());
        let disposal = sell("s1", (2023, 2, 1), dec!(10), dec!(3));

        let settings = TaxSettings {
            include_staking_rewards: false,
            include_airdrops: true,
            ..TaxSettings::default()
        };
        let records = calculate_capital_gains(&[airdrop, disposal], &settings).unwrap();
        assert_eq!(records[0].cost_basis, dec!(20));
    }

    #[test]
    fn test_non_taxable_transfer_out_consumes_without_records() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            tx("w1", (2023, 1, 15), TransactionType::TransferOut, dec!(6), dec!(2)),
            sell("s1", (2023, 2, 1), dec!(5), dec!(3)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        // Only the sell emits records; 4 units remained after the transfer,
        // so 1 unit of the sell is a zero-basis shortfall slice.
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.disposal_id == "s1"));
        assert_eq!(records[0].amount, dec!(4));
        assert_eq!(records[1].cost_basis, Decimal::ZERO);
    }

    #[test]
    fn test_taxable_transfer_out_emits_records() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            tx("w1", (2023, 1, 15), TransactionType::TransferOut, dec!(6), dec!(2)),
        ];

        let settings = TaxSettings {
            taxable_transfers: true,
            ..TaxSettings::default()
        };
        let records = calculate_capital_gains(&ledger, &settings).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].disposal_id, "w1");
        assert_eq!(records[0].gain, dec!(6));
    }

    #[test]
    fn test_stake_and_unstake_never_move_lots() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            tx("k1", (2023, 1, 10), TransactionType::Stake, dec!(10), dec!(1)),
            tx("k2", (2023, 1, 20), TransactionType::Unstake, dec!(10), dec!(1)),
            sell("s1", (2023, 2, 1), dec!(10), dec!(2)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cost_basis, dec!(10));
    }

    #[test]
    fn test_swap_is_a_taxable_disposal() {
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(10), dec!(1)),
            tx("x1", (2023, 2, 1), TransactionType::Swap, dec!(10), dec!(4)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gain, dec!(30));
    }

    #[test]
    fn test_same_day_events_keep_ledger_order() {
        // Buy and sell on the same date: ledger order says the buy came first
        let ledger = vec![
            buy("a1", (2023, 1, 1), dec!(5), dec!(10)),
            sell("s1", (2023, 1, 1), dec!(5), dec!(12)),
        ];

        let records =
            calculate_capital_gains(&ledger, &TaxSettings::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cost_basis, dec!(50));
    }
}
