//! Full timeline derivation for one opportunity.
//!
//! Each scheduled service line is produced by one of two strategies,
//! recorded on the line's schedule:
//! - direct value: the opportunity attributes value to the line, and that
//!   value is classified against the line's own category table;
//! - lead-offering fallback: nothing is attributed, but the line is the
//!   opportunity's lead offering and one of the schedulable lines, so the
//!   opportunity's total value is classified instead.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use forecast_data::{
    Category, DerivationStrategy, Effort, Opportunity, ResourceTimeline, ServiceLineSchedule,
    StagePosition, StageTimelineEntry, TemplateWarning,
};

use crate::engine::category::resolve_category;
use crate::engine::lifecycle::Lifecycle;
use crate::engine::sequencer::sequence;
use crate::engine::templates::EffortTemplates;
use crate::error::{Result, TimelineError};

/// Fixed inputs that shape every generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub lifecycle: Lifecycle,
    /// Lead offerings eligible for the fallback strategy.
    pub schedulable_lead_lines: Vec<String>,
}

/// Category tables consulted during generation.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTables<'a> {
    /// Overall-value classification.
    pub overall: &'a [Category],
    /// Per-service-line classification. Lines without a table use `overall`.
    pub by_service_line: &'a BTreeMap<String, Vec<Category>>,
}

impl<'a> CategoryTables<'a> {
    fn for_line(&self, service_line: &str) -> &'a [Category] {
        self.by_service_line
            .get(service_line)
            .map(Vec::as_slice)
            .unwrap_or(self.overall)
    }
}

/// Service lines that get a schedule, with the strategy that admits each.
pub fn eligible_service_lines(
    opportunity: &Opportunity,
    schedulable_lead_lines: &[String],
) -> BTreeMap<String, DerivationStrategy> {
    let mut lines: BTreeMap<String, DerivationStrategy> = opportunity
        .service_values
        .iter()
        .filter(|(_, value)| value.is_finite() && **value > 0.0)
        .map(|(line, value)| {
            (
                line.clone(),
                DerivationStrategy::DirectValue {
                    attributed_value: *value,
                },
            )
        })
        .collect();

    if let Some(lead) = opportunity.lead_service_line.as_deref() {
        if !lines.contains_key(lead) && schedulable_lead_lines.iter().any(|l| l == lead) {
            lines.insert(
                lead.to_string(),
                DerivationStrategy::LeadOfferingFallback {
                    total_value: opportunity.total_value,
                },
            );
        }
    }

    lines
}

/// Derive a complete resource timeline for `opportunity`.
///
/// Missing template rows become zero effort and are listed in
/// `warnings` on the result.
pub fn generate<T: EffortTemplates + ?Sized>(
    settings: &GeneratorSettings,
    opportunity: &Opportunity,
    tables: CategoryTables<'_>,
    templates: &T,
) -> Result<ResourceTimeline> {
    let anchor = opportunity
        .close_date
        .ok_or_else(|| TimelineError::MissingAnchorDate(opportunity.id.clone()))?;
    let stages = settings.lifecycle.remaining_from(&opportunity.current_stage)?;

    let mut warnings = Vec::new();
    let mut service_lines = BTreeMap::new();

    for (line, strategy) in eligible_service_lines(opportunity, &settings.schedulable_lead_lines) {
        let value = match strategy {
            DerivationStrategy::DirectValue { attributed_value } => Some(attributed_value),
            DerivationStrategy::LeadOfferingFallback { total_value } => total_value,
        };
        let category = resolve_category(value, tables.for_line(&line));

        let mut entries = Vec::with_capacity(stages.len());
        for (idx, stage) in stages.iter().enumerate() {
            let effort = match templates.lookup(&category, &line, stage) {
                Some(effort) => sanitize(effort),
                None => {
                    warnings.push(TemplateWarning {
                        category: category.clone(),
                        service_line: line.clone(),
                        stage_code: stage.clone(),
                    });
                    Effort::ZERO
                }
            };
            let position = if idx == 0 {
                StagePosition::Current
            } else {
                StagePosition::Future
            };
            entries.push(StageTimelineEntry::new(stage, effort, position, anchor));
        }

        sequence(anchor, &mut entries)?;

        debug!(
            opportunity = %opportunity.id,
            service_line = %line,
            strategy = strategy.label(),
            category = %category,
            stages = entries.len(),
            "scheduled service line"
        );

        service_lines.insert(
            line,
            ServiceLineSchedule {
                strategy,
                category,
                entries,
            },
        );
    }

    if !warnings.is_empty() {
        warn!(
            opportunity = %opportunity.id,
            missing = warnings.len(),
            "effort templates missing; affected stages use zero effort"
        );
    }

    Ok(ResourceTimeline {
        opportunity_id: opportunity.id.clone(),
        anchor_date: anchor,
        current_stage: opportunity.current_stage.clone(),
        opportunity_category: resolve_category(opportunity.total_value, tables.overall),
        service_lines,
        manually_edited: false,
        warnings,
    })
}

/// Clamp template figures into the valid range for third-party stores.
fn sanitize(effort: Effort) -> Effort {
    let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Effort::new(clamp(effort.duration_weeks), clamp(effort.fte_required))
}
