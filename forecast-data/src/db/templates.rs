use rusqlite::{params, Connection};

use crate::types::EffortTemplate;

/// Insert or replace one effort template row.
pub fn upsert(conn: &Connection, template: &EffortTemplate) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO effort_templates (category, service_line, stage_code, duration_weeks, fte_required)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(category, service_line, stage_code)
         DO UPDATE SET duration_weeks = excluded.duration_weeks,
                       fte_required = excluded.fte_required",
        params![
            template.category,
            template.service_line,
            template.stage_code,
            template.duration_weeks,
            template.fte_required,
        ],
    )?;
    Ok(())
}

/// List the whole template table.
pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<EffortTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT category, service_line, stage_code, duration_weeks, fte_required
         FROM effort_templates ORDER BY category, service_line, stage_code",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(EffortTemplate {
            category: row.get(0)?,
            service_line: row.get(1)?,
            stage_code: row.get(2)?,
            duration_weeks: row.get(3)?,
            fte_required: row.get(4)?,
        })
    })?;
    rows.collect()
}
