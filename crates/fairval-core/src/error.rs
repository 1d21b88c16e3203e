use thiserror::Error;

/// Validation and contract errors exposed by `fairval-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("period end must be a calendar date formatted YYYY-MM-DD: '{value}'")]
    InvalidPeriodEnd { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("time series '{series}' must contain at least one period")]
    EmptySeries { series: &'static str },
    #[error("time series '{series}' contains period {period} more than once")]
    DuplicatePeriod {
        series: &'static str,
        period: String,
    },
    #[error("periods of '{left}' and '{right}' are not aligned")]
    MisalignedPeriods {
        left: &'static str,
        right: &'static str,
    },
}
