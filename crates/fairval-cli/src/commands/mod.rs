mod project;
mod value;

use std::fmt::{Display, Formatter};

use fairval_engine::ValuationReport;
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub use project::TrendProjection;

/// Result of one command, rendered as text or JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Valuation(ValuationReport),
    Projection(TrendProjection),
}

impl Display for CommandOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valuation(report) => Display::fmt(report, f),
            Self::Projection(projection) => Display::fmt(projection, f),
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Value(args) => Ok(CommandOutput::Valuation(
            value::run(args, cli.timeout_ms).await?,
        )),
        Command::Project(args) => Ok(CommandOutput::Projection(project::run(args)?)),
    }
}
