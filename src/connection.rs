use rusqlite::Connection;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Opens a connection to the draw database and makes sure the schema exists.
///
/// Callers own the returned connection for exactly one operation; dropping it
/// closes it, whichever way the operation exits.
pub fn conn(database_url: &Path, busy_timeout: Duration) -> Result<Connection> {
    if let Some(parent) = database_url.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(database_url)?;
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    // Readers keep working while a save holds the write lock.
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    crate::database::create_schema(&conn)?;

    Ok(conn)
}
