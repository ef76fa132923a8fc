use thiserror::Error;

/// Errors raised while interpreting shared data values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Invalid review status: {0}. Valid values: predicted, forecast, planned")]
    InvalidStatus(String),
}
