//! Manual edits applied to an existing timeline.
//!
//! Every function here takes the current document and returns a complete
//! replacement; the input is never mutated. A duration change re-sequences
//! the whole chain of its service line because the chain hangs off the
//! anchor date. FTE and status changes never touch dates.

use forecast_data::{ResourceTimeline, ReviewStatus, ServiceLineSchedule};

use crate::engine::sequencer::sequence;
use crate::engine::status::{validate_transition, TransitionPolicy};
use crate::engine::templates::check_quantity;
use crate::error::{Result, TimelineError};

/// A change to one stage/service-line cell. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageEdit {
    pub service_line: String,
    pub stage_code: String,
    pub duration_weeks: Option<f64>,
    pub fte_required: Option<f64>,
    pub status: Option<ReviewStatus>,
}

impl StageEdit {
    pub fn new(service_line: &str, stage_code: &str) -> Self {
        Self {
            service_line: service_line.to_string(),
            stage_code: stage_code.to_string(),
            ..Default::default()
        }
    }

    pub fn duration(mut self, weeks: f64) -> Self {
        self.duration_weeks = Some(weeks);
        self
    }

    pub fn fte(mut self, fte: f64) -> Self {
        self.fte_required = Some(fte);
        self
    }

    pub fn status(mut self, status: ReviewStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.duration_weeks.is_none() && self.fte_required.is_none() && self.status.is_none()
    }
}

/// Which entries a bulk status change covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkScope {
    /// Every entry currently in the timeline.
    All,
    ServiceLine(String),
}

/// Result of a bulk status change.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOutcome {
    pub timeline: ResourceTimeline,
    /// Entries whose status field was written.
    pub applied: usize,
    /// Entries whose status actually differed before the write.
    pub changed: usize,
}

/// Apply a single-cell edit and cascade its effects.
pub fn on_stage_edit(
    timeline: &ResourceTimeline,
    edit: &StageEdit,
    policy: TransitionPolicy,
) -> Result<ResourceTimeline> {
    if edit.is_empty() {
        return Err(TimelineError::InvalidArgument(
            "edit must change at least one of duration, FTE or status".to_string(),
        ));
    }
    let new_duration = edit
        .duration_weeks
        .map(|w| check_quantity("duration_weeks", w))
        .transpose()?;
    let new_fte = edit
        .fte_required
        .map(|f| check_quantity("fte_required", f))
        .transpose()?;

    let mut next = timeline.clone();
    let anchor = next.anchor_date;
    let schedule = schedule_mut(&mut next, &edit.service_line)?;
    let idx = schedule
        .entries
        .iter()
        .position(|e| e.stage_code == edit.stage_code)
        .ok_or_else(|| TimelineError::UnknownStage {
            service_line: edit.service_line.clone(),
            stage: edit.stage_code.clone(),
        })?;

    let mut touched = false;
    let mut resequence = false;
    {
        let entry = &mut schedule.entries[idx];

        if let Some(status) = edit.status {
            validate_transition(policy, entry.status, status)?;
            if entry.status != status {
                entry.status = status;
                touched = true;
            }
        }

        if let Some(fte) = new_fte {
            if entry.fte_required != fte {
                entry.fte_required = fte;
                touched = true;
            }
        }

        if let Some(weeks) = new_duration {
            if entry.duration_weeks != weeks {
                entry.duration_weeks = weeks;
                touched = true;
                resequence = true;
            }
        }

        if touched {
            entry.refresh_total();
            entry.edited = true;
        }
    }

    if resequence {
        sequence(anchor, &mut schedule.entries)?;
    }
    if touched {
        next.manually_edited = true;
    }
    Ok(next)
}

/// Set `status` on every entry in `scope` in one pass.
///
/// All target entries are validated before any is written, so a rejected
/// transition leaves the timeline untouched.
pub fn bulk_set_status(
    timeline: &ResourceTimeline,
    status: ReviewStatus,
    scope: &BulkScope,
    policy: TransitionPolicy,
) -> Result<BulkOutcome> {
    if let BulkScope::ServiceLine(line) = scope {
        if !timeline.service_lines.contains_key(line) {
            return Err(TimelineError::UnknownServiceLine(line.clone()));
        }
    }
    let in_scope = |line: &str| match scope {
        BulkScope::All => true,
        BulkScope::ServiceLine(target) => target == line,
    };

    for (line, entry) in timeline.entries() {
        if in_scope(line) {
            validate_transition(policy, entry.status, status)?;
        }
    }

    let mut next = timeline.clone();
    let mut applied = 0;
    let mut changed = 0;
    for (line, schedule) in next.service_lines.iter_mut() {
        if !in_scope(line) {
            continue;
        }
        for entry in schedule.entries.iter_mut() {
            applied += 1;
            if entry.status != status {
                entry.status = status;
                entry.edited = true;
                changed += 1;
            }
        }
    }
    if changed > 0 {
        next.manually_edited = true;
    }

    Ok(BulkOutcome {
        timeline: next,
        applied,
        changed,
    })
}

fn schedule_mut<'a>(timeline: &'a mut ResourceTimeline, service_line: &str) -> Result<&'a mut ServiceLineSchedule> {
    timeline
        .service_lines
        .get_mut(service_line)
        .ok_or_else(|| TimelineError::UnknownServiceLine(service_line.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use forecast_data::{DerivationStrategy, Effort, StagePosition, StageTimelineEntry};

    use super::*;
    use crate::engine::sequencer::is_contiguous;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(anchor: NaiveDate, efforts: &[(&str, f64, f64)]) -> ServiceLineSchedule {
        let mut entries: Vec<StageTimelineEntry> = efforts
            .iter()
            .enumerate()
            .map(|(i, (stage, weeks, fte))| {
                let position = if i == 0 { StagePosition::Current } else { StagePosition::Future };
                StageTimelineEntry::new(stage, Effort::new(*weeks, *fte), position, anchor)
            })
            .collect();
        sequence(anchor, &mut entries).unwrap();
        ServiceLineSchedule {
            strategy: DerivationStrategy::DirectValue { attributed_value: 10.0 },
            category: "CatC".to_string(),
            entries,
        }
    }

    fn timeline() -> ResourceTimeline {
        let anchor = date(2024, 6, 1);
        ResourceTimeline {
            opportunity_id: "opp-1".to_string(),
            anchor_date: anchor,
            current_stage: "3".to_string(),
            opportunity_category: "CatB".to_string(),
            service_lines: BTreeMap::from([
                (
                    "CES".to_string(),
                    schedule(anchor, &[("3", 4.0, 2.0), ("4A", 2.0, 1.0), ("4B", 1.0, 1.0)]),
                ),
                (
                    "INS".to_string(),
                    schedule(anchor, &[("3", 3.0, 1.0), ("4A", 1.0, 0.5), ("4B", 2.0, 2.0)]),
                ),
            ]),
            manually_edited: false,
            warnings: vec![],
        }
    }

    #[test]
    fn test_duration_edit_resequences_whole_chain() {
        let before = timeline();
        let edit = StageEdit::new("CES", "4A").duration(3.0);
        let after = on_stage_edit(&before, &edit, TransitionPolicy::Permissive).unwrap();

        let ces = &after.service_lines["CES"].entries;
        assert!(is_contiguous(after.anchor_date, ces));
        assert_eq!(ces[2], before.service_lines["CES"].entries[2], "later stage unchanged");
        assert_eq!(ces[1].start_date, date(2024, 5, 4));
        assert_eq!(ces[1].end_date, date(2024, 5, 25));
        assert_eq!(ces[0].end_date, date(2024, 5, 4));
        assert_eq!(ces[0].start_date, date(2024, 4, 6));
        assert_eq!(ces[1].total_effort_weeks, 3.0);
        assert!(ces[1].edited);
        assert!(after.manually_edited);
    }

    #[test]
    fn test_duration_edit_is_isolated() {
        let before = timeline();
        let edit = StageEdit::new("CES", "3").duration(6.0);
        let after = on_stage_edit(&before, &edit, TransitionPolicy::Permissive).unwrap();

        assert_eq!(after.service_lines["INS"], before.service_lines["INS"]);
        let (old, new) = (&before.service_lines["CES"].entries[0], &after.service_lines["CES"].entries[0]);
        assert_eq!(new.fte_required, old.fte_required);
        assert_eq!(new.status, old.status);
        assert_eq!(new.stage_code, old.stage_code);
        assert_eq!(new.position, old.position);
    }

    #[test]
    fn test_fte_edit_keeps_dates() {
        let before = timeline();
        let edit = StageEdit::new("INS", "4B").fte(3.0);
        let after = on_stage_edit(&before, &edit, TransitionPolicy::Permissive).unwrap();

        for (old, new) in before.service_lines["INS"].entries.iter().zip(&after.service_lines["INS"].entries) {
            assert_eq!(old.start_date, new.start_date);
            assert_eq!(old.end_date, new.end_date);
        }
        let entry = &after.service_lines["INS"].entries[2];
        assert_eq!(entry.fte_required, 3.0);
        assert_eq!(entry.total_effort_weeks, 6.0);
    }

    #[test]
    fn test_status_edit_touches_only_status() {
        let before = timeline();
        let edit = StageEdit::new("CES", "3").status(ReviewStatus::Forecast);
        let after = on_stage_edit(&before, &edit, TransitionPolicy::Permissive).unwrap();

        let (old, new) = (&before.service_lines["CES"].entries[0], &after.service_lines["CES"].entries[0]);
        assert_eq!(new.status, ReviewStatus::Forecast);
        assert_eq!(new.start_date, old.start_date);
        assert_eq!(new.end_date, old.end_date);
        assert_eq!(new.effort(), old.effort());
        assert_eq!(new.total_effort_weeks, old.total_effort_weeks);
        assert!(after.has_manual_edits());
    }

    #[test]
    fn test_input_timeline_not_mutated() {
        let before = timeline();
        let snapshot = before.clone();
        let _ = on_stage_edit(&before, &StageEdit::new("CES", "3").duration(9.0), TransitionPolicy::Permissive)
            .unwrap();
        assert_eq!(before, snapshot);
    }

    #[test]
    fn test_unchanged_values_are_not_edits() {
        let before = timeline();
        let edit = StageEdit::new("CES", "3").duration(4.0).fte(2.0);
        let after = on_stage_edit(&before, &edit, TransitionPolicy::Permissive).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_invalid_edits_rejected() {
        let t = timeline();
        let p = TransitionPolicy::Permissive;

        let err = on_stage_edit(&t, &StageEdit::new("CES", "9").duration(1.0), p).unwrap_err();
        assert!(matches!(err, TimelineError::UnknownStage { .. }));

        let err = on_stage_edit(&t, &StageEdit::new("BPS", "3").duration(1.0), p).unwrap_err();
        assert!(matches!(err, TimelineError::UnknownServiceLine(_)));

        let err = on_stage_edit(&t, &StageEdit::new("CES", "3").duration(-1.0), p).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidQuantity { .. }));

        let err = on_stage_edit(&t, &StageEdit::new("CES", "3").fte(f64::NAN), p).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidQuantity { .. }));

        let err = on_stage_edit(&t, &StageEdit::new("CES", "3"), p).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidArgument(_)));
    }

    #[test]
    fn test_forward_only_policy_blocks_regression() {
        let t = timeline();
        let planned = on_stage_edit(
            &t,
            &StageEdit::new("CES", "3").status(ReviewStatus::Planned),
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();
        let err = on_stage_edit(
            &planned,
            &StageEdit::new("CES", "3").status(ReviewStatus::Predicted).fte(5.0),
            TransitionPolicy::ForwardOnly,
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTransition { .. }));
    }

    #[test]
    fn test_bulk_status_changes_only_status_fields() {
        let before = timeline();
        let outcome = bulk_set_status(&before, ReviewStatus::Planned, &BulkScope::All, TransitionPolicy::Permissive)
            .unwrap();

        assert_eq!(outcome.applied, 6);
        assert_eq!(outcome.changed, 6);
        for ((_, old), (_, new)) in before.entries().zip(outcome.timeline.entries()) {
            assert_eq!(new.status, ReviewStatus::Planned);
            assert_eq!(new.start_date, old.start_date);
            assert_eq!(new.end_date, old.end_date);
            assert_eq!(new.duration_weeks, old.duration_weeks);
            assert_eq!(new.fte_required, old.fte_required);
            assert_eq!(new.total_effort_weeks, old.total_effort_weeks);
        }
    }

    #[test]
    fn test_bulk_status_scoped_to_service_line() {
        let before = timeline();
        let outcome = bulk_set_status(
            &before,
            ReviewStatus::Forecast,
            &BulkScope::ServiceLine("INS".to_string()),
            TransitionPolicy::Permissive,
        )
        .unwrap();
        assert_eq!(outcome.applied, 3);
        assert_eq!(outcome.timeline.service_lines["CES"], before.service_lines["CES"]);

        let err = bulk_set_status(
            &before,
            ReviewStatus::Forecast,
            &BulkScope::ServiceLine("BPS".to_string()),
            TransitionPolicy::Permissive,
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::UnknownServiceLine(_)));
    }

    #[test]
    fn test_bulk_status_is_all_or_nothing() {
        let t = timeline();
        let one_planned = on_stage_edit(
            &t,
            &StageEdit::new("INS", "4B").status(ReviewStatus::Planned),
            TransitionPolicy::ForwardOnly,
        )
        .unwrap();

        let err = bulk_set_status(
            &one_planned,
            ReviewStatus::Forecast,
            &BulkScope::All,
            TransitionPolicy::ForwardOnly,
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTransition { .. }));
    }
}
