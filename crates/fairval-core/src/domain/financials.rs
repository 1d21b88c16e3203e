use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EstimateHorizon, Symbol, TimeSeries, ValidationError};

/// Cash-flow statement lines used by the model.
///
/// Capital expenditures are reported as negative amounts, so free cash flow
/// is the plain sum of the two lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CashFlowDocument", into = "CashFlowDocument")]
pub struct CashFlowHistory {
    operating_cash_flow: TimeSeries,
    capital_expenditures: TimeSeries,
}

impl CashFlowHistory {
    pub fn new(operating_cash_flow: TimeSeries, capital_expenditures: TimeSeries) -> Self {
        Self {
            operating_cash_flow: operating_cash_flow.renamed("operatingCashFlow"),
            capital_expenditures: capital_expenditures.renamed("capitalExpenditures"),
        }
    }

    pub fn operating_cash_flow(&self) -> &TimeSeries {
        &self.operating_cash_flow
    }

    pub fn capital_expenditures(&self) -> &TimeSeries {
        &self.capital_expenditures
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashFlowDocument {
    operating_cash_flow: TimeSeries,
    capital_expenditures: TimeSeries,
}

impl TryFrom<CashFlowDocument> for CashFlowHistory {
    type Error = ValidationError;

    fn try_from(value: CashFlowDocument) -> Result<Self, Self::Error> {
        Ok(Self::new(value.operating_cash_flow, value.capital_expenditures))
    }
}

impl From<CashFlowHistory> for CashFlowDocument {
    fn from(value: CashFlowHistory) -> Self {
        Self {
            operating_cash_flow: value.operating_cash_flow,
            capital_expenditures: value.capital_expenditures,
        }
    }
}

/// Income-statement lines used by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IncomeDocument", into = "IncomeDocument")]
pub struct IncomeHistory {
    total_revenue: TimeSeries,
    net_income: TimeSeries,
}

impl IncomeHistory {
    pub fn new(total_revenue: TimeSeries, net_income: TimeSeries) -> Self {
        Self {
            total_revenue: total_revenue.renamed("totalRevenue"),
            net_income: net_income.renamed("netIncome"),
        }
    }

    pub fn total_revenue(&self) -> &TimeSeries {
        &self.total_revenue
    }

    pub fn net_income(&self) -> &TimeSeries {
        &self.net_income
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeDocument {
    total_revenue: TimeSeries,
    net_income: TimeSeries,
}

impl TryFrom<IncomeDocument> for IncomeHistory {
    type Error = ValidationError;

    fn try_from(value: IncomeDocument) -> Result<Self, Self::Error> {
        Ok(Self::new(value.total_revenue, value.net_income))
    }
}

impl From<IncomeHistory> for IncomeDocument {
    fn from(value: IncomeHistory) -> Self {
        Self {
            total_revenue: value.total_revenue,
            net_income: value.net_income,
        }
    }
}

/// Consensus revenue estimate for one horizon. Either field may be missing
/// upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizonEstimate {
    #[serde(default)]
    pub avg: Option<f64>,
    #[serde(default)]
    pub growth: Option<f64>,
}

/// Analyst revenue estimates. An analyst count of zero means no coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueEstimates {
    pub analyst_count: u32,
    #[serde(default)]
    pub horizons: BTreeMap<EstimateHorizon, HorizonEstimate>,
}

impl RevenueEstimates {
    pub fn uncovered() -> Self {
        Self::default()
    }

    pub fn new(analyst_count: u32) -> Self {
        Self {
            analyst_count,
            horizons: BTreeMap::new(),
        }
    }

    pub fn with_horizon(
        mut self,
        horizon: EstimateHorizon,
        avg: Option<f64>,
        growth: Option<f64>,
    ) -> Self {
        self.horizons.insert(horizon, HorizonEstimate { avg, growth });
        self
    }

    pub const fn has_coverage(&self) -> bool {
        self.analyst_count > 0
    }

    pub fn horizon(&self, horizon: EstimateHorizon) -> Option<&HorizonEstimate> {
        self.horizons.get(&horizon)
    }
}

/// Scalar facts about the listed company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProfileDocument")]
pub struct CompanyProfile {
    pub shares_outstanding: f64,
    pub current_price: f64,
    #[serde(default)]
    pub peg_ratio: Option<f64>,
}

impl CompanyProfile {
    pub fn new(
        shares_outstanding: f64,
        current_price: f64,
        peg_ratio: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("sharesOutstanding", shares_outstanding)?;
        validate_non_negative("currentPrice", current_price)?;
        if let Some(peg) = peg_ratio {
            if !peg.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "pegRatio" });
            }
        }

        Ok(Self {
            shares_outstanding,
            current_price,
            peg_ratio,
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument {
    shares_outstanding: f64,
    current_price: f64,
    #[serde(default)]
    peg_ratio: Option<f64>,
}

impl TryFrom<ProfileDocument> for CompanyProfile {
    type Error = ValidationError;

    fn try_from(value: ProfileDocument) -> Result<Self, Self::Error> {
        Self::new(
            value.shares_outstanding,
            value.current_price,
            value.peg_ratio,
        )
    }
}

/// Everything one valuation run needs from the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFinancials {
    pub symbol: Symbol,
    pub cash_flow: CashFlowHistory,
    pub income: IncomeHistory,
    #[serde(default)]
    pub estimates: RevenueEstimates,
    pub profile: CompanyProfile,
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
