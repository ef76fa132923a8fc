use crate::error::{Result, TimelineError};

/// The fixed, ordered chain of sales stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    stages: Vec<String>,
}

impl Lifecycle {
    pub fn new(stages: Vec<String>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    /// Execution index of a stage code.
    pub fn position(&self, stage_code: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage_code)
    }

    /// The current stage and every stage after it. Completed stages are dropped.
    pub fn remaining_from(&self, current: &str) -> Result<&[String]> {
        let idx = self
            .position(current)
            .ok_or_else(|| TimelineError::StageNotInLifecycle(current.to_string()))?;
        Ok(&self.stages[idx..])
    }
}

impl<S: Into<String>> FromIterator<S> for Lifecycle {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
