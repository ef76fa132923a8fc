use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use forecast_data::{ResourceTimeline, ReviewStatus, StageTimelineEntry};

/// Roll-up of one service line's schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceLineSummary {
    pub strategy: &'static str,
    pub category: String,
    pub stages: usize,
    pub total_duration_weeks: f64,
    pub total_effort_weeks: f64,
    pub peak_fte: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Roll-up of a whole timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSummary {
    pub service_lines: BTreeMap<String, ServiceLineSummary>,
    pub total_effort_weeks: f64,
    /// Highest FTE demand on any single day across all service lines.
    pub peak_concurrent_fte: f64,
    pub status_counts: BTreeMap<ReviewStatus, usize>,
    pub warnings: usize,
}

pub fn summarize(timeline: &ResourceTimeline) -> TimelineSummary {
    let service_lines: BTreeMap<String, ServiceLineSummary> = timeline
        .service_lines
        .iter()
        .map(|(line, schedule)| {
            let entries = &schedule.entries;
            let summary = ServiceLineSummary {
                strategy: schedule.strategy.label(),
                category: schedule.category.clone(),
                stages: entries.len(),
                total_duration_weeks: entries.iter().map(|e| e.duration_weeks).sum(),
                total_effort_weeks: entries.iter().map(|e| e.total_effort_weeks).sum(),
                peak_fte: entries.iter().map(|e| e.fte_required).fold(0.0, f64::max),
                start_date: entries.first().map(|e| e.start_date),
            };
            (line.clone(), summary)
        })
        .collect();

    let mut status_counts = BTreeMap::new();
    for (_, entry) in timeline.entries() {
        *status_counts.entry(entry.status).or_insert(0) += 1;
    }

    TimelineSummary {
        total_effort_weeks: service_lines.values().map(|s| s.total_effort_weeks).sum(),
        peak_concurrent_fte: peak_concurrent_fte(timeline.entries().map(|(_, e)| e)),
        service_lines,
        status_counts,
        warnings: timeline.warnings.len(),
    }
}

/// Sweep over `[start, end)` spans; zero-length spans carry no load.
fn peak_concurrent_fte<'a>(entries: impl Iterator<Item = &'a StageTimelineEntry>) -> f64 {
    let mut events: Vec<(NaiveDate, f64)> = Vec::new();
    for entry in entries.filter(|e| e.start_date < e.end_date && e.fte_required > 0.0) {
        events.push((entry.start_date, entry.fte_required));
        events.push((entry.end_date, -entry.fte_required));
    }
    // Releases sort before acquisitions on the same day.
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut load: f64 = 0.0;
    let mut peak: f64 = 0.0;
    for (_, delta) in events {
        load += delta;
        peak = peak.max(load);
    }
    peak
}
