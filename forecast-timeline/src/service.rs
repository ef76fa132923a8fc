//! Transactional operations over stored timelines.
//!
//! Each mutating operation reads the current document, computes a full
//! replacement with the pure engine functions and writes it back inside one
//! `BEGIN IMMEDIATE` transaction. SQLite admits a single such writer at a
//! time, so a regeneration and a bulk edit for the same opportunity can
//! never interleave, and a failed batch commits nothing.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use forecast_data::db::timelines::{self, StoredTimeline};
use forecast_data::db::{categories, opportunities, templates as template_rows};
use forecast_data::{ResourceTimeline, ReviewStatus};

use crate::config::ForecastConfig;
use crate::engine::cascade::{self, BulkOutcome, BulkScope, StageEdit};
use crate::engine::generator::{generate, CategoryTables, GeneratorSettings};
use crate::engine::status::TransitionPolicy;
use crate::engine::templates::TemplateTable;
use crate::error::{Result, TimelineError};

/// Settings every operation needs, resolved once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContext {
    pub settings: GeneratorSettings,
    pub policy: TransitionPolicy,
}

impl EngineContext {
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            settings: GeneratorSettings {
                lifecycle: config.lifecycle(),
                schedulable_lead_lines: config.schedulable_lead_lines.clone(),
            },
            policy: config.transition_policy,
        }
    }
}

/// Regenerate and store the timeline for an opportunity.
///
/// Overwrites any stored timeline unconditionally. Callers must consult
/// [`has_manual_edits`] and obtain confirmation first, or use
/// [`generate_if_unedited`].
pub fn generate_timeline(conn: &mut Connection, ctx: &EngineContext, opportunity_id: &str) -> Result<ResourceTimeline> {
    let timeline = regenerate(conn, ctx, opportunity_id, true)?;
    timeline.ok_or_else(|| TimelineError::InvalidArgument("regeneration was refused".to_string()))
}

/// Regenerate unless the stored timeline carries manual edits.
///
/// The edit check and the write share one transaction. Returns `None`
/// (and writes nothing) when edits exist.
pub fn generate_if_unedited(
    conn: &mut Connection,
    ctx: &EngineContext,
    opportunity_id: &str,
) -> Result<Option<ResourceTimeline>> {
    regenerate(conn, ctx, opportunity_id, false)
}

fn regenerate(
    conn: &mut Connection,
    ctx: &EngineContext,
    opportunity_id: &str,
    overwrite_edits: bool,
) -> Result<Option<ResourceTimeline>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let opportunity = opportunities::find(&tx, opportunity_id)?
        .ok_or_else(|| TimelineError::OpportunityNotFound(opportunity_id.to_string()))?;

    let replaced_edits = timelines::find(&tx, opportunity_id)?
        .map_or(false, |stored| stored.timeline.has_manual_edits());
    if replaced_edits && !overwrite_edits {
        info!(opportunity = %opportunity_id, "stored timeline has manual edits; not regenerating");
        return Ok(None);
    }

    let overall = categories::list_overall(&tx)?;
    let by_service_line = categories::list_by_service_line(&tx)?;
    let templates = TemplateTable::from_rows(template_rows::list_all(&tx)?)?;

    let timeline = generate(
        &ctx.settings,
        &opportunity,
        CategoryTables {
            overall: &overall,
            by_service_line: &by_service_line,
        },
        &templates,
    )?;

    timelines::save(&tx, &timeline, Utc::now())?;
    tx.commit()?;

    info!(
        opportunity = %opportunity_id,
        service_lines = timeline.service_lines.len(),
        entries = timeline.entry_count(),
        warnings = timeline.warnings.len(),
        replaced_edits,
        "generated resource timeline"
    );
    Ok(Some(timeline))
}

/// Whether the stored timeline has moved away from its generated defaults.
///
/// An opportunity without a stored timeline has no edits.
pub fn has_manual_edits(conn: &Connection, opportunity_id: &str) -> Result<bool> {
    ensure_opportunity(conn, opportunity_id)?;
    Ok(timelines::find(conn, opportunity_id)?
        .map_or(false, |stored| stored.timeline.has_manual_edits()))
}

/// Point read of the stored timeline.
pub fn load_timeline(conn: &Connection, opportunity_id: &str) -> Result<StoredTimeline> {
    ensure_opportunity(conn, opportunity_id)?;
    timelines::find(conn, opportunity_id)?
        .ok_or_else(|| TimelineError::TimelineNotFound(opportunity_id.to_string()))
}

/// Apply a single-cell edit (with cascade) and store the result.
pub fn recalculate_stage(
    conn: &mut Connection,
    ctx: &EngineContext,
    opportunity_id: &str,
    edit: &StageEdit,
) -> Result<ResourceTimeline> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = load_timeline(&tx, opportunity_id)?.timeline;

    let next = cascade::on_stage_edit(&current, edit, ctx.policy)?;
    timelines::save(&tx, &next, Utc::now())?;
    tx.commit()?;

    debug!(
        opportunity = %opportunity_id,
        service_line = %edit.service_line,
        stage = %edit.stage_code,
        duration = ?edit.duration_weeks,
        fte = ?edit.fte_required,
        status = ?edit.status,
        "recalculated stage"
    );
    Ok(next)
}

/// Set one status on every entry in `scope` as a single batch.
pub fn bulk_set_status(
    conn: &mut Connection,
    ctx: &EngineContext,
    opportunity_id: &str,
    status: ReviewStatus,
    scope: &BulkScope,
) -> Result<BulkOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = load_timeline(&tx, opportunity_id)?.timeline;

    let outcome = cascade::bulk_set_status(&current, status, scope, ctx.policy)?;
    timelines::save(&tx, &outcome.timeline, Utc::now())?;
    tx.commit()?;

    info!(
        opportunity = %opportunity_id,
        %status,
        applied = outcome.applied,
        changed = outcome.changed,
        "bulk status update"
    );
    Ok(outcome)
}

fn ensure_opportunity(conn: &Connection, opportunity_id: &str) -> Result<()> {
    if opportunities::find(conn, opportunity_id)?.is_none() {
        return Err(TimelineError::OpportunityNotFound(opportunity_id.to_string()));
    }
    Ok(())
}
