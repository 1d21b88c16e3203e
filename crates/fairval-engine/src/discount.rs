//! Terminal value and present-value discounting.

use fairval_core::ProjectionPeriod;
use serde::Serialize;

use crate::error::ValuationError;
use crate::projection::Projection;

/// One discounted bucket of the cash-flow schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlowBucket {
    pub period: ProjectionPeriod,
    pub cash_flow: f64,
    pub discount_factor: f64,
    pub present_value: f64,
}

/// Reject rate pairs for which the Gordon growth formula is meaningless.
pub fn check_rates(required_return: f64, perpetual_growth: f64) -> Result<(), ValuationError> {
    let invalid = || ValuationError::InvalidDiscountRate {
        required_return,
        perpetual_growth,
    };
    if !required_return.is_finite() || !perpetual_growth.is_finite() {
        return Err(invalid());
    }
    if required_return <= perpetual_growth || required_return <= -1.0 {
        return Err(invalid());
    }
    Ok(())
}

/// `(1 + required_return)` raised to the bucket's distance from today.
pub fn discount_factor(required_return: f64, period: ProjectionPeriod) -> f64 {
    (1.0 + required_return).powi(period.discount_exponent())
}

/// Gordon growth value of every cash flow after the final explicit period.
pub fn terminal_value(
    final_cash_flow: f64,
    required_return: f64,
    perpetual_growth: f64,
) -> Result<f64, ValuationError> {
    check_rates(required_return, perpetual_growth)?;
    Ok(final_cash_flow * (1.0 + perpetual_growth) / (required_return - perpetual_growth))
}

/// Build the six-bucket schedule `[terminalValue, +4Y, .., 0Y]` and discount
/// every bucket.
pub fn discount_schedule(
    cash_flows: &Projection,
    required_return: f64,
    perpetual_growth: f64,
) -> Result<Vec<CashFlowBucket>, ValuationError> {
    let terminal = terminal_value(cash_flows.furthest(), required_return, perpetual_growth)?;

    let buckets = ProjectionPeriod::BUCKETS
        .into_iter()
        .map(|period| {
            let cash_flow = cash_flows.get(period).unwrap_or(terminal);
            let discount_factor = discount_factor(required_return, period);
            CashFlowBucket {
                period,
                cash_flow,
                discount_factor,
                present_value: cash_flow / discount_factor,
            }
        })
        .collect();
    Ok(buckets)
}
