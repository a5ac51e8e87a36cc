//! Database schema migrations for fitstreak.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version. Both
//! [`Database`](super::Database) and [`ActivityLog`](crate::activity::ActivityLog)
//! run them, so either may open a fresh file first.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(tx: &rusqlite::Transaction<'_>, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: key-value table and daily status records.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_status (
            date           TEXT PRIMARY KEY,
            status         TEXT NOT NULL,
            activity_count INTEGER NOT NULL DEFAULT 0
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: `updated_at` on daily status rows, lower-case status tags.
///
/// Early builds stored upper-case tags (`WORKOUT`, `REST`, ...).
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "ALTER TABLE daily_status ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';
         UPDATE daily_status SET status = lower(status);
         CREATE INDEX IF NOT EXISTS idx_daily_status_status_date ON daily_status(status, date);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: activity tables read by the activity source.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS workout_sessions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            performed_on TEXT NOT NULL,
            name         TEXT NOT NULL DEFAULT '',
            duration_min INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS nutrition_entries (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            performed_on TEXT NOT NULL,
            label        TEXT NOT NULL DEFAULT '',
            calories     INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS exercise_logs (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            performed_on TEXT NOT NULL,
            exercise     TEXT NOT NULL,
            reps         INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_workout_sessions_date ON workout_sessions(performed_on);
        CREATE INDEX IF NOT EXISTS idx_nutrition_entries_date ON nutrition_entries(performed_on);
        CREATE INDEX IF NOT EXISTS idx_exercise_logs_date ON exercise_logs(performed_on);",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}
