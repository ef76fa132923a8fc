use serde::{Deserialize, Serialize};

use forecast_data::ReviewStatus;

use crate::error::{Result, TimelineError};

/// Which review-status moves a user may make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be set from any other.
    #[default]
    Permissive,
    /// Only predicted -> forecast -> planned, never back.
    ForwardOnly,
}

/// Validate a review-status change is allowed under `policy`.
pub fn validate_transition(policy: TransitionPolicy, from: ReviewStatus, to: ReviewStatus) -> Result<()> {
    let valid = match policy {
        TransitionPolicy::Permissive => true,
        TransitionPolicy::ForwardOnly => to >= from,
    };

    if valid {
        Ok(())
    } else {
        Err(TimelineError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Statuses reachable from `from` (other than staying put).
pub fn valid_transitions(policy: TransitionPolicy, from: ReviewStatus) -> Vec<ReviewStatus> {
    ReviewStatus::ALL
        .into_iter()
        .filter(|to| *to != from && validate_transition(policy, from, *to).is_ok())
        .collect()
}
