use std::collections::HashMap;

use forecast_data::{Effort, EffortTemplate};

use crate::error::{Result, TimelineError};

/// Read-only access to the (category, service line, stage) effort table.
pub trait EffortTemplates {
    fn lookup(&self, category: &str, service_line: &str, stage_code: &str) -> Option<Effort>;

    /// Effort for a cell, or zero effort when the table has no row for it.
    fn effort_for(&self, category: &str, service_line: &str, stage_code: &str) -> Effort {
        self.lookup(category, service_line, stage_code)
            .unwrap_or(Effort::ZERO)
    }
}

/// In-memory snapshot of the effort template table.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    rows: HashMap<(String, String, String), Effort>,
}

impl TemplateTable {
    /// Build a table from rows, rejecting negative or non-finite values.
    /// Later rows for the same key replace earlier ones.
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = EffortTemplate>,
    {
        let mut table = Self::default();
        for row in rows {
            validate_template(&row)?;
            table.rows.insert(
                (row.category.clone(), row.service_line.clone(), row.stage_code.clone()),
                row.effort(),
            );
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl EffortTemplates for TemplateTable {
    fn lookup(&self, category: &str, service_line: &str, stage_code: &str) -> Option<Effort> {
        self.rows
            .get(&(category.to_string(), service_line.to_string(), stage_code.to_string()))
            .copied()
    }
}

/// Check a duration or FTE figure is a finite number `>= 0`.
pub fn check_quantity(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TimelineError::InvalidQuantity { field, value })
    }
}

pub fn validate_template(template: &EffortTemplate) -> Result<()> {
    if template.category.is_empty() || template.service_line.is_empty() || template.stage_code.is_empty() {
        return Err(TimelineError::InvalidArgument(format!(
            "effort template key must be complete: ({:?}, {:?}, {:?})",
            template.category, template.service_line, template.stage_code
        )));
    }
    check_quantity("duration_weeks", template.duration_weeks)?;
    check_quantity("fte_required", template.fte_required)?;
    Ok(())
}
