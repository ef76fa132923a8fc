use rusqlite::Connection;

/// Schema version written by the latest migration.
pub const SCHEMA_VERSION: u32 = 2;

/// Run all pending migrations on the database.
///
/// Uses `PRAGMA user_version` to track which migrations have been applied.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    if version < 2 {
        migrate_v1_to_v2(conn)?;
    }

    if version < SCHEMA_VERSION {
        tracing::info!(from = version, to = SCHEMA_VERSION, "migrated database schema");
    }

    Ok(())
}

fn migrate_v0_to_v1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE opportunities (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL DEFAULT '',
            total_value         REAL,
            close_date          TEXT,
            current_stage       TEXT NOT NULL,
            lead_service_line   TEXT
        );

        CREATE TABLE opportunity_service_values (
            opportunity_id      TEXT NOT NULL REFERENCES opportunities ON DELETE CASCADE,
            service_line        TEXT NOT NULL,
            contract_value      REAL NOT NULL,
            PRIMARY KEY (opportunity_id, service_line)
        );

        CREATE TABLE categories (
            id                  INTEGER PRIMARY KEY,
            scope               TEXT NOT NULL,
            name                TEXT NOT NULL,
            min_value           REAL NOT NULL,
            max_value           REAL,
            UNIQUE(scope, name)
        );

        CREATE TABLE effort_templates (
            category            TEXT NOT NULL,
            service_line        TEXT NOT NULL,
            stage_code          TEXT NOT NULL,
            duration_weeks      REAL NOT NULL CHECK (duration_weeks >= 0),
            fte_required        REAL NOT NULL CHECK (fte_required >= 0),
            PRIMARY KEY (category, service_line, stage_code)
        );

        CREATE INDEX idx_categories_scope ON categories(scope);

        PRAGMA user_version = 1;
        ",
    )?;
    Ok(())
}

fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE resource_timelines (
            opportunity_id      TEXT PRIMARY KEY REFERENCES opportunities ON DELETE CASCADE,
            document            TEXT NOT NULL,
            manually_edited     INTEGER NOT NULL DEFAULT 0,
            updated_at          TEXT NOT NULL
        );

        PRAGMA user_version = 2;
        ",
    )?;
    Ok(())
}
