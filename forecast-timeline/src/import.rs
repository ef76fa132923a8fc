//! Loading upstream data (opportunities, category tables, effort templates).

use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use tracing::info;

use forecast_data::db::categories::{self, OVERALL_SCOPE};
use forecast_data::db::{opportunities, templates as template_rows};
use forecast_data::{Opportunity, Snapshot};

use crate::engine::category::validate_categories;
use crate::engine::templates::validate_template;
use crate::error::{Result, TimelineError};

/// Counts of what an import wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub opportunities: usize,
    pub category_tables: usize,
    pub templates: usize,
}

/// Read a JSON snapshot from disk.
pub fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse snapshot {}", path.display()))
}

/// Validate and store a snapshot in one transaction.
///
/// The overall category table is replaced when the snapshot carries one;
/// each named service-line table replaces that line's table. Opportunities
/// and templates are upserted.
pub fn import_snapshot(conn: &mut Connection, snapshot: &Snapshot) -> Result<ImportReport> {
    validate_snapshot(snapshot)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut report = ImportReport::default();

    for opportunity in &snapshot.opportunities {
        opportunities::upsert(&tx, opportunity)?;
        report.opportunities += 1;
    }

    if !snapshot.categories.is_empty() {
        categories::replace_scope(&tx, OVERALL_SCOPE, &snapshot.categories)?;
        report.category_tables += 1;
    }
    for (line, table) in &snapshot.service_line_categories {
        categories::replace_scope(&tx, line, table)?;
        report.category_tables += 1;
    }

    for template in &snapshot.templates {
        template_rows::upsert(&tx, template)?;
        report.templates += 1;
    }

    tx.commit()?;
    info!(
        opportunities = report.opportunities,
        category_tables = report.category_tables,
        templates = report.templates,
        "imported snapshot"
    );
    Ok(report)
}

fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    for opportunity in &snapshot.opportunities {
        validate_opportunity(opportunity)?;
    }

    validate_categories("overall", &snapshot.categories)?;
    for (line, table) in &snapshot.service_line_categories {
        if line.trim().is_empty() {
            return Err(TimelineError::InvalidArgument(
                "service-line category table needs a service line name".to_string(),
            ));
        }
        validate_categories(line, table)?;
    }

    for template in &snapshot.templates {
        validate_template(template)?;
    }
    Ok(())
}

fn validate_opportunity(opportunity: &Opportunity) -> Result<()> {
    if opportunity.id.trim().is_empty() {
        return Err(TimelineError::InvalidArgument("opportunity id must not be empty".to_string()));
    }
    if opportunity.current_stage.trim().is_empty() {
        return Err(TimelineError::InvalidArgument(format!(
            "opportunity '{}' has no current stage",
            opportunity.id
        )));
    }
    if let Some((line, value)) = opportunity
        .service_values
        .iter()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(TimelineError::InvalidArgument(format!(
            "opportunity '{}' has non-finite value {} for service line '{}'",
            opportunity.id, value, line
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use forecast_data::db::open_in_memory;
    use forecast_data::{Category, EffortTemplate};

    use super::*;

    fn snapshot() -> Snapshot {
        serde_json::from_str(
            r#"{
                "opportunities": [
                    {"id": "opp-1", "total_value": 20.0, "service_values": {"CES": 20.0},
                     "close_date": "2024-06-01", "current_stage": "3", "lead_service_line": "CES"}
                ],
                "categories": [
                    {"name": "CatC", "min_value": 0.0, "max_value": 15.0},
                    {"name": "CatB", "min_value": 15.0}
                ],
                "service_line_categories": {
                    "CES": [{"name": "Any", "min_value": 0.0}]
                },
                "templates": [
                    {"category": "Any", "service_line": "CES", "stage_code": "3",
                     "duration_weeks": 4.0, "fte_required": 1.0}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_import_writes_everything() {
        let mut conn = open_in_memory().unwrap();
        let report = import_snapshot(&mut conn, &snapshot()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                opportunities: 1,
                category_tables: 2,
                templates: 1
            }
        );

        let opp = opportunities::find(&conn, "opp-1").unwrap().unwrap();
        assert_eq!(opp.service_values.get("CES"), Some(&20.0));
        assert_eq!(categories::list_overall(&conn).unwrap().len(), 2);
        assert_eq!(categories::list_by_service_line(&conn).unwrap()["CES"].len(), 1);
        assert_eq!(template_rows::list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_category_table_rejects_whole_import() {
        let mut conn = open_in_memory().unwrap();
        let mut bad = snapshot();
        bad.service_line_categories = BTreeMap::from([(
            "INS".to_string(),
            vec![Category::new("Low", 0.0, Some(5.0)), Category::new("High", 10.0, None)],
        )]);

        let err = import_snapshot(&mut conn, &bad).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidCategories { ref table, .. } if table == "INS"));
        assert!(opportunities::list_ids(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_negative_template_rejected() {
        let mut conn = open_in_memory().unwrap();
        let mut bad = snapshot();
        bad.templates.push(EffortTemplate {
            category: "Any".to_string(),
            service_line: "CES".to_string(),
            stage_code: "4A".to_string(),
            duration_weeks: 1.0,
            fte_required: -0.5,
        });
        assert!(import_snapshot(&mut conn, &bad).is_err());
        assert!(template_rows::list_all(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_read_snapshot_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, serde_json::to_string(&snapshot()).unwrap()).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), snapshot());

        let err = read_snapshot(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read snapshot"));
    }
}
