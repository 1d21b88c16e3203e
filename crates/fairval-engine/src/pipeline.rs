//! End-to-end valuation of one ticker.

use fairval_core::{FinancialDataProvider, Symbol};
use tracing::info;

use crate::cost_of_capital::{CostOfCapital, FixedCostOfCapital};
use crate::error::PipelineError;
use crate::report::ValuationReport;
use crate::valuation::{MarginMethod, ValuationEngine, DEFAULT_PERPETUAL_GROWTH};

/// Tunable inputs of a valuation run.
#[derive(Debug)]
pub struct ValuationSettings {
    pub perpetual_growth: f64,
    pub cost_of_capital: Box<dyn CostOfCapital>,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            perpetual_growth: DEFAULT_PERPETUAL_GROWTH,
            cost_of_capital: Box::new(FixedCostOfCapital::default()),
        }
    }
}

impl ValuationSettings {
    pub fn with_perpetual_growth(mut self, perpetual_growth: f64) -> Self {
        self.perpetual_growth = perpetual_growth;
        self
    }

    pub fn with_cost_of_capital(mut self, cost_of_capital: impl CostOfCapital + 'static) -> Self {
        self.cost_of_capital = Box::new(cost_of_capital);
        self
    }
}

/// Fetch a company's financials and value it with both margin methods.
pub async fn value_ticker(
    provider: &dyn FinancialDataProvider,
    ticker: &str,
    settings: &ValuationSettings,
) -> Result<ValuationReport, PipelineError> {
    let symbol = Symbol::parse(ticker)?;

    info!(symbol = %symbol, provider = %provider.id(), "fetching financials");
    let financials = provider.financials(&symbol).await?;

    let required_return = settings.cost_of_capital.required_return(&financials)?;
    let engine = ValuationEngine::new(settings.perpetual_growth);
    let regression =
        engine.compute_fair_value(&financials, MarginMethod::Regression, required_return)?;
    let historical_mean =
        engine.compute_fair_value(&financials, MarginMethod::HistoricalMean, required_return)?;

    info!(
        symbol = %symbol,
        regression = regression.fair_value_per_share,
        historical_mean = historical_mean.fair_value_per_share,
        "valuation complete"
    );

    Ok(ValuationReport::new(
        financials.symbol,
        financials.profile.current_price,
        regression,
        historical_mean,
        financials.profile.peg_ratio,
    ))
}
