//! Least-squares trend projection.
//!
//! Historical values arrive most-recent first. Position `count` in the slice
//! is placed on a synthetic time axis at `x = n - count - 1`, so the oldest
//! observation sits at `x = 0` and the newest at `x = n - 1`. A straight line
//! is fitted by ordinary least squares and evaluated at the five steps that
//! follow the history, `x = n..=n + 4`.
//!
//! The fit is always linear. Curved histories are extrapolated along their
//! best straight line.

use fairval_core::TimeSeries;
use serde::Serialize;

use crate::error::ValuationError;

/// Number of forecast points produced by [`project`].
pub const HORIZON: usize = 5;

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line to values ordered most-recent first.
    pub fn fit(values: &[f64]) -> Result<Self, ValuationError> {
        let len = values.len();
        if len < 2 {
            return Err(ValuationError::DegenerateRegression { len });
        }

        let n = len as f64;
        let sum_xy = values
            .iter()
            .enumerate()
            .map(|(count, y)| (n - count as f64 - 1.0) * y)
            .sum::<f64>();
        let sum_x2 = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
        let sum_x = (n - 1.0) * n / 2.0;
        let sum_y = values.iter().sum::<f64>();

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x.powi(2));
        let intercept = (sum_y - slope * sum_x) / n;

        Ok(Self { slope, intercept })
    }

    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Project five future points, furthest future first (`+4Y` .. `0Y`).
pub fn project(values: &[f64]) -> Result<[f64; HORIZON], ValuationError> {
    let fit = LinearFit::fit(values)?;
    let n = values.len() as f64;
    Ok(std::array::from_fn(|index| {
        fit.at(n + (HORIZON - 1 - index) as f64)
    }))
}

/// [`project`] over the values of a statement line.
pub fn project_series(series: &TimeSeries) -> Result<[f64; HORIZON], ValuationError> {
    project(&series.values())
}
