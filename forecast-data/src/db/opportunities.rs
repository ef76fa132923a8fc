use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::types::Opportunity;

/// Insert or replace an opportunity and its service-line value breakdown.
///
/// The breakdown is replaced wholesale; lines missing from `opp` are removed.
pub fn upsert(conn: &Connection, opp: &Opportunity) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO opportunities (id, name, total_value, close_date, current_stage, lead_service_line)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id)
         DO UPDATE SET name = excluded.name,
                       total_value = excluded.total_value,
                       close_date = excluded.close_date,
                       current_stage = excluded.current_stage,
                       lead_service_line = excluded.lead_service_line",
        params![
            opp.id,
            opp.name,
            opp.total_value,
            opp.close_date,
            opp.current_stage,
            opp.lead_service_line,
        ],
    )?;

    conn.execute(
        "DELETE FROM opportunity_service_values WHERE opportunity_id = ?1",
        params![opp.id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO opportunity_service_values (opportunity_id, service_line, contract_value)
         VALUES (?1, ?2, ?3)",
    )?;
    for (line, value) in &opp.service_values {
        stmt.execute(params![opp.id, line, value])?;
    }
    Ok(())
}

/// Find an opportunity by id, including its service-line values.
pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Opportunity>> {
    let opp = conn
        .query_row(
            "SELECT id, name, total_value, close_date, current_stage, lead_service_line
             FROM opportunities WHERE id = ?1",
            params![id],
            |row| {
                Ok(Opportunity {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    total_value: row.get(2)?,
                    close_date: row.get(3)?,
                    current_stage: row.get(4)?,
                    lead_service_line: row.get(5)?,
                    service_values: BTreeMap::new(),
                })
            },
        )
        .optional()?;

    match opp {
        Some(mut opp) => {
            opp.service_values = service_values(conn, id)?;
            Ok(Some(opp))
        }
        None => Ok(None),
    }
}

/// List all opportunity ids, sorted.
pub fn list_ids(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM opportunities ORDER BY id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

fn service_values(conn: &Connection, id: &str) -> rusqlite::Result<BTreeMap<String, f64>> {
    let mut stmt = conn.prepare(
        "SELECT service_line, contract_value FROM opportunity_service_values
         WHERE opportunity_id = ?1 ORDER BY service_line",
    )?;
    let rows = stmt.query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}
