//! Backward, deadline-anchored date placement.
//!
//! The last stage ends on the anchor date and each earlier stage ends where
//! its successor starts.

use chrono::{NaiveDate, TimeDelta};

use forecast_data::StageTimelineEntry;

use crate::error::{Result, TimelineError};

/// Whole days for a duration in weeks, rounded to the nearest day.
pub fn weeks_to_days(weeks: f64) -> i64 {
    (weeks * 7.0).round() as i64
}

/// Assign start and end dates to `entries` (in execution order), walking
/// from the last entry back to the first.
pub fn sequence(anchor: NaiveDate, entries: &mut [StageTimelineEntry]) -> Result<()> {
    let mut end = anchor;
    for entry in entries.iter_mut().rev() {
        let start = TimeDelta::try_days(weeks_to_days(entry.duration_weeks))
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| {
                TimelineError::InvalidArgument(format!(
                    "stage '{}' ({} weeks) starts before the supported calendar range",
                    entry.stage_code, entry.duration_weeks
                ))
            })?;
        entry.end_date = end;
        entry.start_date = start;
        end = start;
    }
    Ok(())
}

/// True when the chain ends on `anchor` and adjacent entries touch.
pub fn is_contiguous(anchor: NaiveDate, entries: &[StageTimelineEntry]) -> bool {
    let ends_on_anchor = entries.last().map_or(true, |last| last.end_date == anchor);
    ends_on_anchor
        && entries
            .windows(2)
            .all(|pair| pair[0].end_date == pair[1].start_date)
}
