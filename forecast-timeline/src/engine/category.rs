//! Threshold classification of contract values.
//!
//! Bands are half-open, `[min, max)`, at every call site: a value equal to a
//! band's maximum belongs to the next band up.

use forecast_data::{Category, UNCATEGORIZED};

use crate::error::{Result, TimelineError};

/// Map a value to the name of the band containing it.
///
/// Missing, negative or non-finite values and empty tables yield
/// [`UNCATEGORIZED`]. Never fails.
pub fn resolve_category(value: Option<f64>, categories: &[Category]) -> String {
    let Some(value) = value.filter(|v| v.is_finite() && *v >= 0.0) else {
        return UNCATEGORIZED.to_string();
    };

    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| a.min_value.total_cmp(&b.min_value));

    if let Some(found) = sorted.iter().rev().find(|c| c.contains(value)) {
        return found.name.clone();
    }

    // Above every bounded band but short of the open band's floor (gapped table).
    let highest_bounded = sorted
        .iter()
        .filter_map(|c| c.max_value)
        .max_by(f64::total_cmp);
    if highest_bounded.is_some_and(|max| value >= max) {
        if let Some(top) = sorted.iter().find(|c| c.is_unbounded()) {
            return top.name.clone();
        }
    }

    UNCATEGORIZED.to_string()
}

/// Check that a table partitions the value axis into contiguous bands with
/// exactly one open-ended band on top.
pub fn validate_categories(table: &str, categories: &[Category]) -> Result<()> {
    let invalid = |reason: String| TimelineError::InvalidCategories {
        table: table.to_string(),
        reason,
    };

    if categories.is_empty() {
        return Ok(());
    }

    let mut sorted: Vec<&Category> = categories.iter().collect();
    sorted.sort_by(|a, b| a.min_value.total_cmp(&b.min_value));

    for category in &sorted {
        if category.name.trim().is_empty() {
            return Err(invalid("category with empty name".to_string()));
        }
        if !category.min_value.is_finite() {
            return Err(invalid(format!("'{}' has a non-finite minimum", category.name)));
        }
        if let Some(max) = category.max_value {
            if !max.is_finite() || max <= category.min_value {
                return Err(invalid(format!(
                    "'{}' has maximum {} not above its minimum {}",
                    category.name, max, category.min_value
                )));
            }
        }
    }

    let unbounded = sorted.iter().filter(|c| c.is_unbounded()).count();
    if unbounded != 1 {
        return Err(invalid(format!(
            "expected exactly one band without a maximum, found {}",
            unbounded
        )));
    }

    for pair in sorted.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        match lower.max_value {
            None => {
                return Err(invalid(format!(
                    "open-ended band '{}' must be the highest",
                    lower.name
                )))
            }
            Some(max) if max > upper.min_value => {
                return Err(invalid(format!("'{}' overlaps '{}'", lower.name, upper.name)))
            }
            Some(max) if max < upper.min_value => {
                return Err(invalid(format!(
                    "gap between '{}' (ends {}) and '{}' (starts {})",
                    lower.name, max, upper.name, upper.min_value
                )))
            }
            Some(_) => {}
        }
    }

    Ok(())
}
