use std::io::{self, BufRead, Write};

use fairval_core::{FinancialDataProvider, FixtureProvider, YahooAdapter};
use fairval_engine::{value_ticker, FixedCostOfCapital, ValuationReport, ValuationSettings};
use tracing::debug;

use crate::cli::ValueArgs;
use crate::error::CliError;

pub async fn run(args: &ValueArgs, timeout_ms: u64) -> Result<ValuationReport, CliError> {
    let ticker = match &args.ticker {
        Some(ticker) => ticker.clone(),
        None => prompt_ticker(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let provider: Box<dyn FinancialDataProvider> = match &args.fixture {
        Some(path) => {
            debug!(path = %path.display(), "loading fixture");
            Box::new(FixtureProvider::from_path(path)?)
        }
        None => Box::new(YahooAdapter::default().with_timeout_ms(timeout_ms)),
    };

    let settings = ValuationSettings::default()
        .with_perpetual_growth(args.perpetual_growth)
        .with_cost_of_capital(FixedCostOfCapital::new(args.required_return));

    Ok(value_ticker(provider.as_ref(), &ticker, &settings).await?)
}

fn prompt_ticker(input: &mut impl BufRead, output: &mut impl Write) -> Result<String, CliError> {
    write!(output, "Enter ticker: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CliError::Input("no ticker entered".to_string()));
    }
    Ok(line.trim().to_string())
}
