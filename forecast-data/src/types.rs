use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Category name used whenever a value cannot be classified.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Opportunity record as handed over by the pipeline system (read-only here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Total contract value. `None` when the pipeline has no figure yet.
    #[serde(default)]
    pub total_value: Option<f64>,
    /// Contract value attributed to each service line.
    #[serde(default)]
    pub service_values: BTreeMap<String, f64>,
    /// Target close/decision date, the anchor for backward scheduling.
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    pub current_stage: String,
    #[serde(default)]
    pub lead_service_line: Option<String>,
}

/// One threshold band. The band covers `[min_value, max_value)`; a missing
/// maximum means the band is unbounded above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub min_value: f64,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl Category {
    pub fn new(name: &str, min_value: f64, max_value: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            min_value,
            max_value,
        }
    }

    /// Half-open membership test: `min <= value < max`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_value && self.max_value.map_or(true, |max| value < max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_value.is_none()
    }
}

/// Duration and staffing level for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Effort {
    pub duration_weeks: f64,
    pub fte_required: f64,
}

impl Effort {
    pub const ZERO: Effort = Effort {
        duration_weeks: 0.0,
        fte_required: 0.0,
    };

    pub fn new(duration_weeks: f64, fte_required: f64) -> Self {
        Self {
            duration_weeks,
            fte_required,
        }
    }

    pub fn total_effort_weeks(&self) -> f64 {
        self.duration_weeks * self.fte_required
    }
}

/// Row of the effort template table: (category, service line, stage) -> effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortTemplate {
    pub category: String,
    pub service_line: String,
    pub stage_code: String,
    pub duration_weeks: f64,
    pub fte_required: f64,
}

impl EffortTemplate {
    pub fn effort(&self) -> Effort {
        Effort::new(self.duration_weeks, self.fte_required)
    }
}

/// Review status of a single stage/service-line cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// System default, not yet reviewed.
    #[default]
    Predicted,
    /// Reviewed, tentative.
    Forecast,
    /// Committed.
    Planned,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Predicted,
        ReviewStatus::Forecast,
        ReviewStatus::Planned,
    ];
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Predicted => write!(f, "predicted"),
            ReviewStatus::Forecast => write!(f, "forecast"),
            ReviewStatus::Planned => write!(f, "planned"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "predicted" => Ok(ReviewStatus::Predicted),
            "forecast" => Ok(ReviewStatus::Forecast),
            "planned" => Ok(ReviewStatus::Planned),
            _ => Err(DataError::InvalidStatus(s.to_string())),
        }
    }
}

/// Where a scheduled stage sits relative to the opportunity's present stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePosition {
    Current,
    Future,
}

/// One scheduled stage within a service line's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTimelineEntry {
    pub stage_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_weeks: f64,
    pub fte_required: f64,
    pub total_effort_weeks: f64,
    #[serde(default)]
    pub status: ReviewStatus,
    pub position: StagePosition,
    /// Set once duration, FTE or status has been changed by hand.
    #[serde(default)]
    pub edited: bool,
}

impl StageTimelineEntry {
    /// Create an entry with a zero-length placeholder span at `anchor`.
    /// Dates are assigned by the sequencer.
    pub fn new(stage_code: &str, effort: Effort, position: StagePosition, anchor: NaiveDate) -> Self {
        Self {
            stage_code: stage_code.to_string(),
            start_date: anchor,
            end_date: anchor,
            duration_weeks: effort.duration_weeks,
            fte_required: effort.fte_required,
            total_effort_weeks: effort.total_effort_weeks(),
            status: ReviewStatus::Predicted,
            position,
            edited: false,
        }
    }

    pub fn effort(&self) -> Effort {
        Effort::new(self.duration_weeks, self.fte_required)
    }

    /// Recompute the derived total from duration and FTE.
    pub fn refresh_total(&mut self) {
        self.total_effort_weeks = self.effort().total_effort_weeks();
    }
}

/// Which path produced a service line's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DerivationStrategy {
    /// The opportunity attributes non-zero value to this service line.
    DirectValue { attributed_value: f64 },
    /// No value attributed, but the line is the opportunity's lead offering.
    LeadOfferingFallback { total_value: Option<f64> },
}

impl DerivationStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            DerivationStrategy::DirectValue { .. } => "direct_value",
            DerivationStrategy::LeadOfferingFallback { .. } => "lead_offering_fallback",
        }
    }
}

/// Schedule for one service line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLineSchedule {
    #[serde(flatten)]
    pub strategy: DerivationStrategy,
    pub category: String,
    pub entries: Vec<StageTimelineEntry>,
}

/// Gap in the effort template table noticed during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateWarning {
    pub category: String,
    pub service_line: String,
    pub stage_code: String,
}

impl std::fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no effort template for category '{}', service line '{}', stage '{}'; using 0 weeks / 0 FTE",
            self.category, self.service_line, self.stage_code
        )
    }
}

/// Staffing schedule for one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTimeline {
    pub opportunity_id: String,
    pub anchor_date: NaiveDate,
    pub current_stage: String,
    /// Classification of the opportunity's total value against the overall table.
    pub opportunity_category: String,
    #[serde(default)]
    pub service_lines: BTreeMap<String, ServiceLineSchedule>,
    #[serde(default)]
    pub manually_edited: bool,
    #[serde(default)]
    pub warnings: Vec<TemplateWarning>,
}

impl ResourceTimeline {
    /// True when anything has moved away from the generated defaults.
    pub fn has_manual_edits(&self) -> bool {
        self.manually_edited
            || self
                .entries()
                .any(|(_, e)| e.edited || e.status != ReviewStatus::Predicted)
    }

    /// All entries paired with their service line, in service-line order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &StageTimelineEntry)> {
        self.service_lines
            .iter()
            .flat_map(|(line, schedule)| schedule.entries.iter().map(move |e| (line.as_str(), e)))
    }

    pub fn entry_count(&self) -> usize {
        self.service_lines.values().map(|s| s.entries.len()).sum()
    }
}

/// Bundle of external inputs handed over by upstream collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
    /// Overall-value classification table.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Per-service-line classification tables.
    #[serde(default)]
    pub service_line_categories: BTreeMap<String, Vec<Category>>,
    #[serde(default)]
    pub templates: Vec<EffortTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_review_status_from_str() {
        assert_eq!("predicted".parse::<ReviewStatus>().unwrap(), ReviewStatus::Predicted);
        assert_eq!("Forecast".parse::<ReviewStatus>().unwrap(), ReviewStatus::Forecast);
        assert_eq!(" PLANNED ".parse::<ReviewStatus>().unwrap(), ReviewStatus::Planned);
        assert!("committed".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_review_status_defaults_to_predicted() {
        assert_eq!(ReviewStatus::default(), ReviewStatus::Predicted);
    }

    #[test]
    fn test_category_is_half_open() {
        let band = Category::new("CatC", 5.0, Some(15.0));
        assert!(band.contains(5.0));
        assert!(band.contains(14.999));
        assert!(!band.contains(15.0));
        assert!(!band.contains(4.999));

        let top = Category::new("CatA", 30.0, None);
        assert!(top.contains(30.0));
        assert!(top.contains(1e12));
    }

    #[test]
    fn test_strategy_serializes_as_tagged_variant() {
        let schedule = ServiceLineSchedule {
            strategy: DerivationStrategy::LeadOfferingFallback { total_value: Some(12.0) },
            category: "CatC".to_string(),
            entries: vec![],
        };
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["strategy"], "lead_offering_fallback");
        assert_eq!(json["total_value"], 12.0);

        let back: ServiceLineSchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn test_has_manual_edits_tracks_status_and_flags() {
        let anchor = date(2024, 6, 1);
        let mut timeline = ResourceTimeline {
            opportunity_id: "opp-1".to_string(),
            anchor_date: anchor,
            current_stage: "3".to_string(),
            opportunity_category: "CatA".to_string(),
            service_lines: BTreeMap::new(),
            manually_edited: false,
            warnings: vec![],
        };
        timeline.service_lines.insert(
            "CES".to_string(),
            ServiceLineSchedule {
                strategy: DerivationStrategy::DirectValue { attributed_value: 10.0 },
                category: "CatC".to_string(),
                entries: vec![StageTimelineEntry::new(
                    "3",
                    Effort::new(2.0, 1.5),
                    StagePosition::Current,
                    anchor,
                )],
            },
        );
        assert!(!timeline.has_manual_edits());
        assert_eq!(timeline.entry_count(), 1);

        timeline.service_lines.get_mut("CES").unwrap().entries[0].status = ReviewStatus::Forecast;
        assert!(timeline.has_manual_edits());
    }

    #[test]
    fn test_entry_total_effort() {
        let mut entry = StageTimelineEntry::new("4A", Effort::new(4.0, 2.5), StagePosition::Future, date(2024, 6, 1));
        assert_eq!(entry.total_effort_weeks, 10.0);
        entry.fte_required = 1.0;
        entry.refresh_total();
        assert_eq!(entry.total_effort_weeks, 4.0);
    }
}
