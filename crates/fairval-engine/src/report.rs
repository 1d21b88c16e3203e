//! Comparison of computed fair values against the market.

use std::fmt::{Display, Formatter};

use fairval_core::Symbol;
use serde::Serialize;

use crate::valuation::Valuation;

/// PEG ratios below this mark a stock as undervalued.
pub const PEG_UNDERVALUED_BELOW: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Undervalued,
    Overvalued,
}

impl Verdict {
    /// Undervalued only when the fair value strictly exceeds the price.
    pub fn from_fair_value(fair_value: f64, current_price: f64) -> Self {
        if fair_value > current_price {
            Self::Undervalued
        } else {
            Self::Overvalued
        }
    }

    pub fn from_peg(peg_ratio: f64) -> Self {
        if peg_ratio < PEG_UNDERVALUED_BELOW {
            Self::Undervalued
        } else {
            Self::Overvalued
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undervalued => "undervalued",
            Self::Overvalued => "overvalued",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fair value with its verdict and the valuation behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub fair_value: f64,
    pub verdict: Verdict,
    pub valuation: Valuation,
}

impl Assessment {
    fn new(valuation: Valuation, current_price: f64) -> Self {
        let fair_value = valuation.fair_value_per_share;
        Self {
            fair_value,
            verdict: Verdict::from_fair_value(fair_value, current_price),
            valuation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PegAssessment {
    pub ratio: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub symbol: Symbol,
    pub current_price: f64,
    pub regression: Assessment,
    pub historical_mean: Assessment,
    /// Mean of both fair values; absent when either one is zero.
    pub average: Option<f64>,
    pub peg: Option<PegAssessment>,
}

impl ValuationReport {
    pub fn new(
        symbol: Symbol,
        current_price: f64,
        regression: Valuation,
        historical_mean: Valuation,
        peg_ratio: Option<f64>,
    ) -> Self {
        let regression = Assessment::new(regression, current_price);
        let historical_mean = Assessment::new(historical_mean, current_price);

        let average = (regression.fair_value != 0.0 && historical_mean.fair_value != 0.0)
            .then(|| (regression.fair_value + historical_mean.fair_value) / 2.0);
        let peg = peg_ratio.map(|ratio| PegAssessment {
            ratio,
            verdict: Verdict::from_peg(ratio),
        });

        Self {
            symbol,
            current_price,
            regression,
            historical_mean,
            average,
            peg,
        }
    }
}

impl Display for ValuationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Current value         =  {}", self.current_price)?;
        writeln!(f)?;
        writeln!(
            f,
            "Regression fair value =  {:.2} ({})",
            self.regression.fair_value, self.regression.verdict
        )?;
        writeln!(
            f,
            "Fair value            =  {:.2} ({})",
            self.historical_mean.fair_value, self.historical_mean.verdict
        )?;
        if let Some(average) = self.average {
            writeln!(f, "Average               =  {average:.2}")?;
        }
        match self.peg {
            Some(peg) => writeln!(f, "PEG Ratio             =  {} ({})", peg.ratio, peg.verdict),
            None => writeln!(f, "PEG Ratio             =  n/a"),
        }
    }
}
