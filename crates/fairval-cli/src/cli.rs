//! CLI argument definitions for fairval.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `value` | Estimate fair value per share for a ticker |
//! | `project` | Extend a series with the least-squares trend |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--log-level` | `warn` | Log filter when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! fairval value MRNA
//! fairval value ACME --fixture acme.json --format json --pretty
//! fairval project 100 90 80 70
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fairval_engine::{DEFAULT_PERPETUAL_GROWTH, DEFAULT_REQUIRED_RETURN};

/// Discounted cash flow fair-value calculator.
#[derive(Debug, Parser)]
#[command(
    name = "fairval",
    author,
    version,
    about = "Discounted cash flow fair-value calculator",
    long_about = "fairval projects a company's free cash flow from its historical statements \
and analyst revenue estimates, discounts it to today and compares the resulting fair value \
per share with the market price.\n\
\n\
Use 'fairval <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = fairval_core::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Log filter used when RUST_LOG is not set (e.g. debug, fairval_engine=trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary lines.
    Text,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the fair value per share of a listed company.
    ///
    /// Runs the valuation twice, once extending the historical net-income
    /// margin trend and once holding the average margin flat.
    ///
    /// # Examples
    ///
    ///   fairval value MRNA
    ///   fairval value --required-return 0.09
    ///   fairval value ACME --fixture acme.json
    Value(ValueArgs),

    /// Project five future points from a series given newest first.
    ///
    /// # Examples
    ///
    ///   fairval project 100 90 80 70
    Project(ProjectArgs),
}

#[derive(Debug, Args)]
pub struct ValueArgs {
    /// Ticker symbol; prompted for on stdin when omitted.
    pub ticker: Option<String>,

    /// Rate future cash flows are discounted at.
    #[arg(long, default_value_t = DEFAULT_REQUIRED_RETURN)]
    pub required_return: f64,

    /// Long-run growth rate beyond the explicit forecast.
    #[arg(long, default_value_t = DEFAULT_PERPETUAL_GROWTH)]
    pub perpetual_growth: f64,

    /// Read financials from a JSON document instead of Yahoo Finance.
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Historical values, most recent first.
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub values: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn value_defaults_match_engine_defaults() {
        let cli = Cli::try_parse_from(["fairval", "value", "mrna"]).expect("parse");

        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.timeout_ms, 10_000);
        assert_eq!(cli.log_level, "warn");
        let Command::Value(args) = cli.command else {
            panic!("expected value command");
        };
        assert_eq!(args.ticker.as_deref(), Some("mrna"));
        assert_eq!(args.required_return, 0.075);
        assert_eq!(args.perpetual_growth, 0.025);
        assert!(args.fixture.is_none());
    }

    #[test]
    fn ticker_is_optional() {
        let cli = Cli::try_parse_from(["fairval", "value"]).expect("parse");
        let Command::Value(args) = cli.command else {
            panic!("expected value command");
        };
        assert!(args.ticker.is_none());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "fairval",
            "value",
            "ACME",
            "--fixture",
            "acme.json",
            "--format",
            "json",
            "--pretty",
            "--required-return",
            "0.1",
        ])
        .expect("parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.pretty);
        let Command::Value(args) = cli.command else {
            panic!("expected value command");
        };
        assert_eq!(args.required_return, 0.1);
        assert_eq!(args.fixture, Some(PathBuf::from("acme.json")));
    }

    #[test]
    fn project_accepts_negative_values() {
        let cli = Cli::try_parse_from(["fairval", "project", "-5", "2.5", "10"]).expect("parse");
        let Command::Project(args) = cli.command else {
            panic!("expected project command");
        };
        assert_eq!(args.values, vec![-5.0, 2.5, 10.0]);
    }

    #[test]
    fn project_requires_values() {
        assert!(Cli::try_parse_from(["fairval", "project"]).is_err());
    }
}
