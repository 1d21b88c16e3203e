//! Discounted cash flow valuation.
//!
//! ```text
//! revenue ──┬─ analyst estimates (coverage > 0)
//!           └─ trend projection
//!                 × net-income margin (trend or historical mean)
//!                 = projected net income
//!                 × FCF / net-income conversion rate
//!                 = projected free cash flow ─▶ terminal value ─▶ discount ─▶ / shares
//! ```

use fairval_core::{
    CashFlowHistory, CompanyFinancials, EstimateHorizon, IncomeHistory, RevenueEstimates,
    TimeSeries,
};
use serde::Serialize;
use tracing::debug;

use crate::discount::{check_rates, discount_schedule, CashFlowBucket};
use crate::error::ValuationError;
use crate::projection::Projection;
use crate::stats;
use crate::trend;

/// Long-run growth rate applied beyond the explicit forecast.
pub const DEFAULT_PERPETUAL_GROWTH: f64 = 0.025;

/// Conversion ratios more dispersed than this use the median.
pub const DISPERSION_THRESHOLD: f64 = 1.0;

/// How future net-income margins are derived from history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMethod {
    /// Extend the historical margin trend line.
    Regression,
    /// Hold the historical average margin flat.
    HistoricalMean,
}

/// Where the revenue projection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueSource {
    AnalystEstimates,
    Trend,
}

/// Statistic used to summarise the FCF / net-income ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatistic {
    Mean,
    Median,
}

/// Outcome of one valuation run, with every intermediate projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub margin_method: MarginMethod,
    pub revenue_source: RevenueSource,
    pub required_return: f64,
    pub perpetual_growth: f64,
    pub projected_revenue: Projection,
    pub projected_margin: Projection,
    pub projected_net_income: Projection,
    pub projected_free_cash_flow: Projection,
    pub conversion_rate: f64,
    pub conversion_statistic: ConversionStatistic,
    pub conversion_std_dev: Option<f64>,
    pub buckets: Vec<CashFlowBucket>,
    pub present_value: f64,
    pub shares_outstanding: f64,
    /// Per-share value, never negative.
    pub fair_value_per_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationEngine {
    perpetual_growth: f64,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PERPETUAL_GROWTH)
    }
}

impl ValuationEngine {
    pub const fn new(perpetual_growth: f64) -> Self {
        Self { perpetual_growth }
    }

    pub const fn perpetual_growth(&self) -> f64 {
        self.perpetual_growth
    }

    pub fn compute_fair_value(
        &self,
        financials: &CompanyFinancials,
        margin_method: MarginMethod,
        required_return: f64,
    ) -> Result<Valuation, ValuationError> {
        check_rates(required_return, self.perpetual_growth)?;

        let free_cash_flow = free_cash_flow(&financials.cash_flow)?;
        let margins = net_income_margins(&financials.income)?;

        let (projected_revenue, revenue_source) =
            project_revenue(&financials.income, &financials.estimates)?;
        let projected_margin = project_margins(&margins, margin_method)?;
        let projected_net_income =
            projected_revenue.zip_with(&projected_margin, |revenue, margin| revenue * margin);

        let conversion = conversion_rate(&free_cash_flow, financials.income.net_income())?;
        let projected_free_cash_flow =
            projected_net_income.map(|net_income| net_income * conversion.rate);

        let buckets = discount_schedule(
            &projected_free_cash_flow,
            required_return,
            self.perpetual_growth,
        )?;
        let present_value = buckets.iter().map(|bucket| bucket.present_value).sum::<f64>();

        let shares_outstanding = financials.profile.shares_outstanding;
        if shares_outstanding == 0.0 {
            return Err(ValuationError::ZeroDenominator {
                field: "sharesOutstanding",
                period: "latest".to_string(),
            });
        }
        let fair_value_per_share = (present_value / shares_outstanding).max(0.0);

        debug!(
            symbol = %financials.symbol,
            margin_method = ?margin_method,
            revenue_source = ?revenue_source,
            conversion_statistic = ?conversion.statistic,
            present_value,
            fair_value_per_share,
            "computed fair value"
        );

        Ok(Valuation {
            margin_method,
            revenue_source,
            required_return,
            perpetual_growth: self.perpetual_growth,
            projected_revenue,
            projected_margin,
            projected_net_income,
            projected_free_cash_flow,
            conversion_rate: conversion.rate,
            conversion_statistic: conversion.statistic,
            conversion_std_dev: conversion.std_dev,
            buckets,
            present_value,
            shares_outstanding,
            fair_value_per_share,
        })
    }
}

/// Operating cash flow plus (negative) capital expenditures.
pub fn free_cash_flow(cash_flow: &CashFlowHistory) -> Result<TimeSeries, ValuationError> {
    Ok(cash_flow.operating_cash_flow().zip_with(
        cash_flow.capital_expenditures(),
        "freeCashFlow",
        |ocf, capex| ocf + capex,
    )?)
}

/// Net income over revenue for every reported period.
pub fn net_income_margins(income: &IncomeHistory) -> Result<TimeSeries, ValuationError> {
    ratio(income.net_income(), income.total_revenue(), "netIncomeMargin")
}

/// Analyst-driven revenue when coverage exists, the historical trend otherwise.
pub fn project_revenue(
    income: &IncomeHistory,
    estimates: &RevenueEstimates,
) -> Result<(Projection, RevenueSource), ValuationError> {
    if !estimates.has_coverage() {
        let projected = trend::project_series(income.total_revenue())?;
        return Ok((Projection::from_furthest_first(projected), RevenueSource::Trend));
    }

    let (current, current_growth) = estimate(estimates, EstimateHorizon::CurrentYear)?;
    let (next, next_growth) = estimate(estimates, EstimateHorizon::NextYear)?;
    let growth = (current_growth + next_growth) / 2.0 + 1.0;

    let projected = Projection::from_furthest_first([
        next * growth.powi(3),
        next * growth.powi(2),
        next * growth,
        next,
        current,
    ]);
    Ok((projected, RevenueSource::AnalystEstimates))
}

pub fn project_margins(
    margins: &TimeSeries,
    method: MarginMethod,
) -> Result<Projection, ValuationError> {
    match method {
        MarginMethod::Regression => Ok(Projection::from_furthest_first(trend::project_series(
            margins,
        )?)),
        MarginMethod::HistoricalMean => {
            let mean = stats::mean(&margins.values()).ok_or(ValuationError::MissingDataField {
                field: "netIncomeMargin",
            })?;
            Ok(Projection::constant(mean))
        }
    }
}

/// Chosen FCF / net-income conversion rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRate {
    pub rate: f64,
    pub statistic: ConversionStatistic,
    pub std_dev: Option<f64>,
}

/// Summarise FCF / net income: the median when the sample standard deviation
/// exceeds [`DISPERSION_THRESHOLD`], the mean otherwise.
pub fn conversion_rate(
    free_cash_flow: &TimeSeries,
    net_income: &TimeSeries,
) -> Result<ConversionRate, ValuationError> {
    let ratios = ratio(free_cash_flow, net_income, "freeCashFlowConversion")?.values();
    let std_dev = stats::sample_std_dev(&ratios);

    let statistic = match std_dev {
        Some(spread) if spread > DISPERSION_THRESHOLD => ConversionStatistic::Median,
        _ => ConversionStatistic::Mean,
    };
    let rate = match statistic {
        ConversionStatistic::Median => stats::median(&ratios),
        ConversionStatistic::Mean => stats::mean(&ratios),
    }
    .ok_or(ValuationError::MissingDataField {
        field: "freeCashFlowConversion",
    })?;

    debug!(?statistic, ?std_dev, rate, "selected conversion rate");
    Ok(ConversionRate {
        rate,
        statistic,
        std_dev,
    })
}

fn ratio(
    numerator: &TimeSeries,
    denominator: &TimeSeries,
    name: &'static str,
) -> Result<TimeSeries, ValuationError> {
    let pairs = numerator.pair_with(denominator)?;
    if let Some((period, _, _)) = pairs.iter().find(|(_, _, value)| *value == 0.0) {
        return Err(ValuationError::ZeroDenominator {
            field: denominator.name(),
            period: period.to_string(),
        });
    }
    Ok(numerator.zip_with(denominator, name, |top, bottom| top / bottom)?)
}

fn estimate(
    estimates: &RevenueEstimates,
    horizon: EstimateHorizon,
) -> Result<(f64, f64), ValuationError> {
    let (avg_field, growth_field) = match horizon {
        EstimateHorizon::CurrentYear => ("revenueEstimate[0Y].avg", "revenueEstimate[0Y].growth"),
        EstimateHorizon::NextYear => ("revenueEstimate[+1Y].avg", "revenueEstimate[+1Y].growth"),
    };
    let entry = estimates.horizon(horizon).copied().unwrap_or_default();
    let avg = entry
        .avg
        .ok_or(ValuationError::MissingDataField { field: avg_field })?;
    let growth = entry
        .growth
        .ok_or(ValuationError::MissingDataField {
            field: growth_field,
        })?;
    Ok((avg, growth))
}

#[cfg(test)]
mod tests {
    use fairval_core::{CompanyProfile, PeriodEnd, SeriesPoint, Symbol};

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6 * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    fn series(values: &[f64]) -> TimeSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let period = PeriodEnd::parse(&format!("{}-12-31", 2023 - index))
                    .expect("valid period");
                SeriesPoint::new(period, *value)
            })
            .collect();
        TimeSeries::new("series", points).expect("valid series")
    }

    fn financials(
        revenue: &[f64],
        net_income: &[f64],
        operating_cash_flow: &[f64],
        capex: &[f64],
        shares: f64,
    ) -> CompanyFinancials {
        CompanyFinancials {
            symbol: Symbol::parse("ACME").expect("valid symbol"),
            cash_flow: CashFlowHistory::new(series(operating_cash_flow), series(capex)),
            income: IncomeHistory::new(series(revenue), series(net_income)),
            estimates: RevenueEstimates::uncovered(),
            profile: CompanyProfile::new(shares, 10.0, None).expect("valid profile"),
        }
    }

    fn steady_company() -> CompanyFinancials {
        financials(
            &[1000.0; 4],
            &[100.0; 4],
            &[150.0; 4],
            &[-50.0; 4],
            10.0,
        )
    }

    #[test]
    fn constant_company_matches_closed_form() {
        let (r, g) = (0.075, 0.025);
        let engine = ValuationEngine::new(g);

        let valuation = engine
            .compute_fair_value(&steady_company(), MarginMethod::HistoricalMean, r)
            .expect("valuation");

        let cash_flow = 100.0;
        let terminal = cash_flow * (1.0 + g) / (r - g);
        let explicit = (1..=5)
            .map(|k| cash_flow / (1.0 + r).powi(k))
            .sum::<f64>();
        let expected = terminal / (1.0 + r).powi(6) + explicit;

        assert_eq!(valuation.revenue_source, RevenueSource::Trend);
        assert_close(valuation.buckets[0].cash_flow, terminal);
        assert_close(valuation.present_value, expected);
        assert_close(valuation.fair_value_per_share, expected / 10.0);
    }

    #[test]
    fn regression_margin_on_flat_history_agrees_with_mean() {
        let engine = ValuationEngine::default();
        let company = steady_company();

        let regression = engine
            .compute_fair_value(&company, MarginMethod::Regression, 0.075)
            .expect("regression");
        let mean = engine
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect("mean");

        assert_close(
            regression.fair_value_per_share,
            mean.fair_value_per_share,
        );
    }

    #[test]
    fn dispersed_conversion_ratios_use_median() {
        // Ratios 10, 1, 1, 1: sample std dev 4.5.
        let company = financials(
            &[1000.0; 4],
            &[100.0; 4],
            &[1000.0, 100.0, 100.0, 100.0],
            &[0.0; 4],
            10.0,
        );
        let conversion = conversion_rate(
            &free_cash_flow(&company.cash_flow).expect("fcf"),
            company.income.net_income(),
        )
        .expect("conversion");

        assert_eq!(conversion.statistic, ConversionStatistic::Median);
        assert_close(conversion.rate, 1.0);
        assert_close(conversion.std_dev.expect("std dev"), 4.5);
    }

    #[test]
    fn tight_conversion_ratios_use_mean() {
        let company = financials(
            &[1000.0; 3],
            &[100.0; 3],
            &[120.0, 100.0, 80.0],
            &[0.0; 3],
            10.0,
        );
        let conversion = conversion_rate(
            &free_cash_flow(&company.cash_flow).expect("fcf"),
            company.income.net_income(),
        )
        .expect("conversion");

        assert_eq!(conversion.statistic, ConversionStatistic::Mean);
        assert_close(conversion.rate, 1.0);
    }

    #[test]
    fn std_dev_of_exactly_one_keeps_the_mean() {
        // Ratios 1, 2, 3: sample std dev exactly 1.
        let company = financials(
            &[1000.0; 3],
            &[100.0; 3],
            &[100.0, 200.0, 300.0],
            &[0.0; 3],
            10.0,
        );
        let conversion = conversion_rate(
            &free_cash_flow(&company.cash_flow).expect("fcf"),
            company.income.net_income(),
        )
        .expect("conversion");

        assert_eq!(conversion.std_dev, Some(1.0));
        assert_eq!(conversion.statistic, ConversionStatistic::Mean);
        assert_close(conversion.rate, 2.0);
    }

    #[test]
    fn single_period_ratio_uses_mean() {
        let fcf = series(&[150.0]);
        let net_income = series(&[100.0]);
        let conversion = conversion_rate(&fcf, &net_income).expect("conversion");

        assert_eq!(conversion.statistic, ConversionStatistic::Mean);
        assert_eq!(conversion.std_dev, None);
        assert_close(conversion.rate, 1.5);
    }

    #[test]
    fn analyst_coverage_compounds_next_year_estimate() {
        let estimates = RevenueEstimates::new(12)
            .with_horizon(EstimateHorizon::CurrentYear, Some(1100.0), Some(0.1))
            .with_horizon(EstimateHorizon::NextYear, Some(1210.0), Some(0.2));
        let income = IncomeHistory::new(series(&[1000.0, 900.0]), series(&[100.0, 90.0]));

        let (projection, source) = project_revenue(&income, &estimates).expect("projection");

        assert_eq!(source, RevenueSource::AnalystEstimates);
        let expected = [
            1210.0 * 1.15_f64.powi(3),
            1210.0 * 1.15_f64.powi(2),
            1210.0 * 1.15,
            1210.0,
            1100.0,
        ];
        for (actual, expected) in projection.values().iter().zip(expected) {
            assert_close(*actual, expected);
        }
    }

    #[test]
    fn covered_estimates_missing_growth_fail() {
        let estimates = RevenueEstimates::new(3)
            .with_horizon(EstimateHorizon::CurrentYear, Some(1100.0), Some(0.1))
            .with_horizon(EstimateHorizon::NextYear, Some(1210.0), None);
        let income = IncomeHistory::new(series(&[1000.0, 900.0]), series(&[100.0, 90.0]));

        let error = project_revenue(&income, &estimates).expect_err("must fail");
        assert_eq!(
            error,
            ValuationError::MissingDataField {
                field: "revenueEstimate[+1Y].growth"
            }
        );
    }

    #[test]
    fn negative_present_value_clamps_to_zero() {
        let company = financials(
            &[1000.0; 4],
            &[-100.0; 4],
            &[-120.0; 4],
            &[-30.0; 4],
            10.0,
        );
        let valuation = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect("valuation");

        assert!(valuation.present_value < 0.0);
        assert_eq!(valuation.fair_value_per_share, 0.0);
    }

    #[test]
    fn zero_revenue_is_rejected() {
        let company = financials(
            &[1000.0, 0.0],
            &[100.0, 10.0],
            &[150.0; 2],
            &[-50.0; 2],
            10.0,
        );
        let error = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect_err("must fail");

        assert_eq!(
            error,
            ValuationError::ZeroDenominator {
                field: "totalRevenue",
                period: "2022-12-31".to_string(),
            }
        );
    }

    #[test]
    fn zero_net_income_is_rejected() {
        let company = financials(
            &[1000.0; 2],
            &[0.0, 100.0],
            &[150.0; 2],
            &[-50.0; 2],
            10.0,
        );
        let error = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect_err("must fail");

        assert_eq!(
            error,
            ValuationError::ZeroDenominator {
                field: "netIncome",
                period: "2023-12-31".to_string(),
            }
        );
    }

    #[test]
    fn cash_flow_and_income_periods_must_align() {
        let company = financials(
            &[1000.0; 3],
            &[100.0; 3],
            &[150.0; 4],
            &[-50.0; 4],
            10.0,
        );
        let error = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect_err("must fail");

        assert_eq!(
            error,
            ValuationError::MisalignedPeriods {
                left: "freeCashFlow",
                right: "netIncome",
            }
        );
    }

    #[test]
    fn rate_guard_runs_before_any_data_checks() {
        let company = financials(&[0.0; 1], &[0.0; 1], &[0.0; 1], &[0.0; 1], 0.0);
        let error = ValuationEngine::new(0.08)
            .compute_fair_value(&company, MarginMethod::Regression, 0.075)
            .expect_err("must fail");

        assert!(matches!(error, ValuationError::InvalidDiscountRate { .. }));
    }

    #[test]
    fn single_year_history_cannot_be_trended() {
        let company = financials(&[1000.0], &[100.0], &[150.0], &[-50.0], 10.0);
        let error = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect_err("must fail");

        assert_eq!(error, ValuationError::DegenerateRegression { len: 1 });
    }

    #[test]
    fn zero_shares_outstanding_is_rejected() {
        let company = financials(&[1000.0; 2], &[100.0; 2], &[150.0; 2], &[-50.0; 2], 0.0);
        let error = ValuationEngine::default()
            .compute_fair_value(&company, MarginMethod::HistoricalMean, 0.075)
            .expect_err("must fail");

        assert!(matches!(
            error,
            ValuationError::ZeroDenominator {
                field: "sharesOutstanding",
                ..
            }
        ));
    }
}
