use fairval_core::{SourceError, ValidationError};
use thiserror::Error;

/// Reasons a valuation cannot be computed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    #[error("required data field '{field}' is missing")]
    MissingDataField { field: &'static str },

    #[error("periods of '{left}' and '{right}' are not aligned")]
    MisalignedPeriods {
        left: &'static str,
        right: &'static str,
    },

    #[error("trend projection needs at least 2 observations, got {len}")]
    DegenerateRegression { len: usize },

    #[error(
        "required return {required_return} must exceed perpetual growth rate {perpetual_growth}"
    )]
    InvalidDiscountRate {
        required_return: f64,
        perpetual_growth: f64,
    },

    #[error("'{field}' is zero for period {period}")]
    ZeroDenominator { field: &'static str, period: String },

    #[error(transparent)]
    Validation(ValidationError),
}

impl From<ValidationError> for ValuationError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::MisalignedPeriods { left, right } => {
                Self::MisalignedPeriods { left, right }
            }
            other => Self::Validation(other),
        }
    }
}

/// Failure of an end-to-end valuation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),
}
