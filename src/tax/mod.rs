// Tax module - cost basis matching, holding periods, wash sales, yearly reports

pub mod cost_basis;
pub mod holding_period;
pub mod report;
pub mod settings;
pub mod wash_sale;

pub use cost_basis::{calculate_capital_gains, CapitalGainRecord};
pub use report::{generate_yearly_tax_report, TaxSummary};
pub use settings::{CostBasisMethod, TaxRates, TaxSettings};
pub use wash_sale::{calculate_wash_sales, WashSaleRecord, WASH_SALE_WINDOW_DAYS};
