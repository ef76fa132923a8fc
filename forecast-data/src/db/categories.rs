use std::collections::BTreeMap;

use rusqlite::{params, Connection};

use crate::types::Category;

/// Scope key of the overall-value classification table.
pub const OVERALL_SCOPE: &str = "";

/// Replace the category table for one scope.
///
/// `scope` is [`OVERALL_SCOPE`] for the overall table, otherwise a service line.
pub fn replace_scope(conn: &Connection, scope: &str, categories: &[Category]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM categories WHERE scope = ?1", params![scope])?;
    let mut stmt = conn.prepare(
        "INSERT INTO categories (scope, name, min_value, max_value) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for category in categories {
        stmt.execute(params![scope, category.name, category.min_value, category.max_value])?;
    }
    Ok(())
}

/// List the categories of one scope, ascending by minimum.
pub fn list_scope(conn: &Connection, scope: &str) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT name, min_value, max_value FROM categories
         WHERE scope = ?1 ORDER BY min_value",
    )?;
    let rows = stmt.query_map(params![scope], row_to_category)?;
    rows.collect()
}

/// The overall-value classification table.
pub fn list_overall(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
    list_scope(conn, OVERALL_SCOPE)
}

/// Every per-service-line table, keyed by service line.
pub fn list_by_service_line(conn: &Connection) -> rusqlite::Result<BTreeMap<String, Vec<Category>>> {
    let mut stmt = conn.prepare(
        "SELECT scope, name, min_value, max_value FROM categories
         WHERE scope != ?1 ORDER BY scope, min_value",
    )?;
    let rows = stmt.query_map(params![OVERALL_SCOPE], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Category {
                name: row.get(1)?,
                min_value: row.get(2)?,
                max_value: row.get(3)?,
            },
        ))
    })?;

    let mut tables: BTreeMap<String, Vec<Category>> = BTreeMap::new();
    for row in rows {
        let (scope, category) = row?;
        tables.entry(scope).or_default().push(category);
    }
    Ok(tables)
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        name: row.get(0)?,
        min_value: row.get(1)?,
        max_value: row.get(2)?,
    })
}
