//! Required-return strategies.

use std::fmt::Debug;

use fairval_core::CompanyFinancials;

use crate::error::ValuationError;

/// Rate used when nothing better is configured.
pub const DEFAULT_REQUIRED_RETURN: f64 = 0.075;

/// Supplies the rate future cash flows are discounted at.
pub trait CostOfCapital: Debug + Send + Sync {
    fn required_return(&self, financials: &CompanyFinancials) -> Result<f64, ValuationError>;
}

/// The same rate for every company.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCostOfCapital {
    rate: f64,
}

impl FixedCostOfCapital {
    pub const fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub const fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for FixedCostOfCapital {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_RETURN)
    }
}

impl CostOfCapital for FixedCostOfCapital {
    fn required_return(&self, _financials: &CompanyFinancials) -> Result<f64, ValuationError> {
        Ok(self.rate)
    }
}
