use thiserror::Error;

/// Error types for timeline engine operations.
/// These are used by both the library and binary crates.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Opportunity '{0}' not found")]
    OpportunityNotFound(String),

    #[error("No resource timeline stored for opportunity '{0}'. Run 'forecast-timeline generate' first.")]
    TimelineNotFound(String),

    #[error("Service line '{0}' is not part of this timeline")]
    UnknownServiceLine(String),

    #[error("Stage '{stage}' is not scheduled for service line '{service_line}'")]
    UnknownStage { service_line: String, stage: String },

    #[error("Stage '{0}' is not part of the configured lifecycle")]
    StageNotInLifecycle(String),

    #[error("Opportunity '{0}' has no close date to anchor the schedule")]
    MissingAnchorDate(String),

    #[error("Invalid {field}: {value} (must be a finite number >= 0)")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("Invalid status transition: cannot go from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid category table '{table}': {reason}")]
    InvalidCategories { table: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Data(#[from] forecast_data::DataError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse error classes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Internal,
}

impl TimelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimelineError::OpportunityNotFound(_) | TimelineError::TimelineNotFound(_) => {
                ErrorKind::NotFound
            }
            TimelineError::UnknownServiceLine(_)
            | TimelineError::UnknownStage { .. }
            | TimelineError::StageNotInLifecycle(_)
            | TimelineError::MissingAnchorDate(_)
            | TimelineError::InvalidQuantity { .. }
            | TimelineError::InvalidTransition { .. }
            | TimelineError::InvalidCategories { .. }
            | TimelineError::InvalidArgument(_)
            | TimelineError::Data(_) => ErrorKind::InvalidArgument,
            TimelineError::Config(_)
            | TimelineError::Database(_)
            | TimelineError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            TimelineError::OpportunityNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TimelineError::UnknownStage {
                service_line: "CES".into(),
                stage: "9".into()
            }
            .kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            TimelineError::Database(rusqlite::Error::QueryReturnedNoRows).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_unknown_stage_message() {
        let err = TimelineError::UnknownStage {
            service_line: "CES".into(),
            stage: "9".into(),
        };
        assert_eq!(err.to_string(), "Stage '9' is not scheduled for service line 'CES'");
    }
}
