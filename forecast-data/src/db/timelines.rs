//! Whole-document storage of resource timelines.
//!
//! One row per opportunity. Writes always replace the full document so a
//! stored timeline is never a mix of two computations.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::types::ResourceTimeline;

/// A timeline as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTimeline {
    pub timeline: ResourceTimeline,
    pub manually_edited: bool,
    pub updated_at: DateTime<Utc>,
}

/// Overwrite the stored timeline for `timeline.opportunity_id`.
pub fn save(conn: &Connection, timeline: &ResourceTimeline, updated_at: DateTime<Utc>) -> rusqlite::Result<()> {
    let document = serde_json::to_string(timeline)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO resource_timelines (opportunity_id, document, manually_edited, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(opportunity_id)
         DO UPDATE SET document = excluded.document,
                       manually_edited = excluded.manually_edited,
                       updated_at = excluded.updated_at",
        params![
            timeline.opportunity_id,
            document,
            timeline.has_manual_edits(),
            updated_at,
        ],
    )?;
    Ok(())
}

/// Point read by opportunity id.
pub fn find(conn: &Connection, opportunity_id: &str) -> rusqlite::Result<Option<StoredTimeline>> {
    conn.query_row(
        "SELECT document, manually_edited, updated_at FROM resource_timelines
         WHERE opportunity_id = ?1",
        params![opportunity_id],
        |row| {
            let document: String = row.get(0)?;
            let timeline: ResourceTimeline = serde_json::from_str(&document)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
            Ok(StoredTimeline {
                timeline,
                manually_edited: row.get(1)?,
                updated_at: row.get(2)?,
            })
        },
    )
    .optional()
}
