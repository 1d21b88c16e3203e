//! # Fairval Engine
//!
//! Trend projection and discounted cash flow valuation.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`trend`] | Least-squares line fit and five-step extrapolation |
//! | [`valuation`] | [`ValuationEngine`] and its intermediate results |
//! | [`discount`] | Terminal value and discount schedule |
//! | [`cost_of_capital`] | Required-return strategies |
//! | [`report`] | [`ValuationReport`] and verdicts |
//! | [`pipeline`] | [`value_ticker`] |
//!
//! ## Example
//!
//! ```rust,ignore
//! use fairval_core::FixtureProvider;
//! use fairval_engine::{value_ticker, ValuationSettings};
//!
//! let provider = FixtureProvider::from_path("acme.json")?;
//! let report = value_ticker(&provider, "ACME", &ValuationSettings::default()).await?;
//! print!("{report}");
//! ```

pub mod cost_of_capital;
pub mod discount;
pub mod error;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod stats;
pub mod trend;
pub mod valuation;

pub use cost_of_capital::{CostOfCapital, FixedCostOfCapital, DEFAULT_REQUIRED_RETURN};
pub use discount::{discount_factor, discount_schedule, terminal_value, CashFlowBucket};
pub use error::{PipelineError, ValuationError};
pub use pipeline::{value_ticker, ValuationSettings};
pub use projection::Projection;
pub use report::{Assessment, PegAssessment, ValuationReport, Verdict};
pub use trend::{project, project_series, LinearFit, HORIZON};
pub use valuation::{
    ConversionRate, ConversionStatistic, MarginMethod, RevenueSource, Valuation,
    ValuationEngine, DEFAULT_PERPETUAL_GROWTH,
};
