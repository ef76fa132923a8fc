pub mod categories;
pub mod migrations;
pub mod opportunities;
pub mod templates;
pub mod timelines;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

/// Open the forecast store at `path`, creating the file (and any missing
/// parent directories) on first use, then migrate it.
pub fn open_or_create(path: &Path) -> rusqlite::Result<Connection> {
    prepare_parent(path)?;
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    finish_open(conn)
}

/// Open a migrated in-memory database (tests and dry runs).
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    finish_open(Connection::open_in_memory()?)
}

fn finish_open(conn: Connection) -> rusqlite::Result<Connection> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrations::migrate(&conn)?;
    Ok(conn)
}

fn prepare_parent(path: &Path) -> rusqlite::Result<()> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(dir).map_err(|err| {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
            Some(format!("forecast store directory {} is unusable: {}", dir.display(), err)),
        )
    })
}

/// Returns the default database path: `~/.local/share/forecast/forecast.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("forecast")
        .join("forecast.db")
}

/// Create an in-memory database with migrations applied, for testing.
#[cfg(test)]
pub fn test_db() -> Connection {
    open_in_memory().expect("open in-memory db")
}
