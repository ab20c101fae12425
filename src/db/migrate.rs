use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Key-value table standing in for the browser's local storage.
/// One row per key, value is an opaque string (JSON documents in practice).
fn migrate_create_local_storage(conn: &Connection, quiet: bool) -> Result<()> {
    let version = "20260301_0001_create_local_storage";

    if is_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS local_storage (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    mark_applied(conn, version, "Created local_storage table")?;

    if !quiet {
        success(format!(
            "Migration applied: {} → created 'local_storage' table",
            version
        ));
    }

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by `init_db()` and every time a storage handle is opened, so a
/// database created by an older release keeps working without `init`.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    run_migrations(conn, false)
}

pub(crate) fn run_migrations(conn: &Connection, quiet: bool) -> Result<()> {
    ensure_log_table(conn)?;
    migrate_create_local_storage(conn, quiet)?;
    Ok(())
}
