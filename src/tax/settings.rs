use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lot consumption ordering for the cost-basis engine.
///
/// `SpecificId` is exposed in caller settings but has no lot-selection
/// algorithm; requesting it yields `UnsupportedCostBasisMethod` rather than
/// a guessed heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostBasisMethod {
    Fifo,
    Lifo,
    SpecificId,
}

impl CostBasisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostBasisMethod::Fifo => "FIFO",
            CostBasisMethod::Lifo => "LIFO",
            CostBasisMethod::SpecificId => "SPECIFIC_ID",
        }
    }
}

impl fmt::Display for CostBasisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostBasisMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(CostBasisMethod::Fifo),
            "LIFO" => Ok(CostBasisMethod::Lifo),
            "SPECIFIC_ID" | "SPECIFICID" => Ok(CostBasisMethod::SpecificId),
            _ => Err(()),
        }
    }
}

/// Pass-through short/long-term tax rates supplied by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxRates {
    pub short_term: Decimal,
    pub long_term: Decimal,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            short_term: Decimal::new(37, 2), // 0.37
            long_term: Decimal::new(20, 2),  // 0.20
        }
    }
}

/// Caller-supplied settings steering the cost-basis engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSettings {
    pub cost_basis_method: CostBasisMethod,
    /// Fold fees into acquisition basis and deduct them from proceeds
    pub include_fees: bool,
    /// Treat staking rewards as zero-quantity-cost acquisitions at market value
    pub include_staking_rewards: bool,
    /// Treat airdrop-tagged rewards as acquisitions at market value
    pub include_airdrops: bool,
    /// Whether transfer_out is a taxable disposal (vs. a wallet-internal move)
    pub taxable_transfers: bool,
    /// Raise `InsufficientLotInventory` instead of degrading to a
    /// zero-cost-basis disposal when open lots cannot cover a disposal
    pub strict_inventory: bool,
    pub tax_rate: TaxRates,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            cost_basis_method: CostBasisMethod::Fifo,
            include_fees: true,
            include_staking_rewards: true,
            include_airdrops: true,
            taxable_transfers: false,
            strict_inventory: false,
            tax_rate: TaxRates::default(),
        }
    }
}

impl TaxSettings {
    pub fn with_method(method: CostBasisMethod) -> Self {
        Self {
            cost_basis_method: method,
            ..Self::default()
        }
    }
}
