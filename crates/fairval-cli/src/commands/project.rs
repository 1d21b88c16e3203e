use std::fmt::{Display, Formatter};

use fairval_core::ValidationError;
use fairval_engine::{LinearFit, Projection};
use serde::Serialize;

use crate::cli::ProjectArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct TrendProjection {
    pub history: Vec<f64>,
    pub fit: LinearFit,
    pub forecast: Projection,
}

impl Display for TrendProjection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "slope     = {:.4}", self.fit.slope)?;
        writeln!(f, "intercept = {:.4}", self.fit.intercept)?;
        writeln!(f)?;
        for (period, value) in self.forecast.iter() {
            writeln!(f, "{:<4}= {value:.2}", period.label())?;
        }
        Ok(())
    }
}

pub fn run(args: &ProjectArgs) -> Result<TrendProjection, CliError> {
    if args.values.iter().any(|value| !value.is_finite()) {
        return Err(ValidationError::NonFiniteValue { field: "values" }.into());
    }

    let fit = LinearFit::fit(&args.values)?;
    let forecast = Projection::from_furthest_first(fairval_engine::project(&args.values)?);

    Ok(TrendProjection {
        history: args.values.clone(),
        fit,
        forecast,
    })
}
