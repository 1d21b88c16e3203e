//! # Domain Models
//!
//! Canonical types for the inputs of a discounted-cash-flow valuation.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercased ticker |
//! | [`PeriodEnd`] | Fiscal period end date labelling statement columns |
//! | [`TimeSeries`] | Statement line, most-recent period first |
//! | [`CashFlowHistory`] | Operating cash flow and capital expenditures |
//! | [`IncomeHistory`] | Total revenue and net income |
//! | [`RevenueEstimates`] | Analyst revenue estimates per [`EstimateHorizon`] |
//! | [`CompanyProfile`] | Shares outstanding, price, PEG ratio |
//! | [`CompanyFinancials`] | Everything above for one symbol |
//! | [`ProjectionPeriod`] | Forecast buckets `0Y`..`+4Y` and `terminalValue` |
//!
//! ## Orientation
//!
//! Historical series are always stored newest period first. Element-wise
//! arithmetic between two series is refused unless their period labels match
//! one for one:
//!
//! ```rust,ignore
//! use fairval_core::{TimeSeries, ValidationError};
//!
//! let err = net_income.zip_with(&revenue, "margin", |n, r| n / r);
//! assert!(matches!(err, Err(ValidationError::MisalignedPeriods { .. })));
//! ```

mod financials;
mod period;
mod series;
mod symbol;

pub use financials::{
    CashFlowHistory, CompanyFinancials, CompanyProfile, HorizonEstimate, IncomeHistory,
    RevenueEstimates,
};
pub use period::{EstimateHorizon, PeriodEnd, ProjectionPeriod};
pub use series::{SeriesPoint, TimeSeries};
pub use symbol::Symbol;
