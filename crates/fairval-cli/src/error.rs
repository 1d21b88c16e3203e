use fairval_core::{SourceError, ValidationError};
use fairval_engine::{PipelineError, ValuationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<PipelineError> for CliError {
    fn from(value: PipelineError) -> Self {
        match value {
            PipelineError::Validation(error) => Self::Validation(error),
            PipelineError::Source(error) => Self::Source(error),
            PipelineError::Valuation(error) => Self::Valuation(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Input(_) => 2,
            Self::Source(_) => 3,
            Self::Valuation(_) => 4,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
