//! SQLite-based streak storage.
//!
//! Provides persistent storage for:
//! - Daily status records (one row per calendar date)
//! - Key-value store for application state, including the streak counters

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{DatabaseError, Result};
use crate::streak::{DailyStatusRecord, DayStatus, StreakState};

use super::{data_dir, migrations, DailyStatusStore, StreakStateStore};

/// kv key holding the encoded [`StreakState`].
pub const STREAK_STATE_KEY: &str = "streak_state";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// How long a pass waits for another process's pass to finish.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database for streak storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/fitstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("fitstreak.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn row_to_record(
        date: NaiveDate,
        status: &str,
        activity_count: i64,
        updated_at: &str,
    ) -> DailyStatusRecord {
        DailyStatusRecord {
            date,
            status: DayStatus::decode_or_missed(status),
            activity_count: u32::try_from(activity_count).unwrap_or(0),
            updated_at: DateTime::parse_from_rfc3339(updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
        }
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl DailyStatusStore for Database {
    fn upsert_daily_status(&self, record: &DailyStatusRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO daily_status (date, status, activity_count, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET
                status = excluded.status,
                activity_count = excluded.activity_count,
                updated_at = excluded.updated_at",
            params![
                date_key(record.date),
                record.status.as_str(),
                record.activity_count,
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn daily_status(&self, date: NaiveDate) -> Result<Option<DailyStatusRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT status, activity_count, updated_at FROM daily_status WHERE date = ?1",
                params![date_key(date)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        Ok(row.map(|(status, count, updated_at)| {
            Self::row_to_record(date, &status, count, &updated_at)
        }))
    }

    fn count_status_in_range(
        &self,
        status: DayStatus,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_status
             WHERE lower(status) = ?1 AND date BETWEEN ?2 AND ?3",
            params![status.as_str(), date_key(start), date_key(end)],
            |row| row.get(0),
        )?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn daily_status_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, status, activity_count, updated_at FROM daily_status
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date ASC",
        )?;
        let rows = stmt.query_map(params![date_key(start), date_key(end)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (raw_date, status, count, updated_at) = row?;
            match NaiveDate::parse_from_str(&raw_date, DATE_FORMAT) {
                Ok(date) => records.push(Self::row_to_record(date, &status, count, &updated_at)),
                Err(e) => {
                    tracing::warn!(value = %raw_date, error = %e, "skipping daily status row with invalid date");
                }
            }
        }
        Ok(records)
    }
}

impl StreakStateStore for Database {
    fn read_streak_state(&self) -> Result<Option<StreakState>> {
        Ok(self
            .kv_get(STREAK_STATE_KEY)?
            .and_then(|raw| StreakState::decode(&raw)))
    }

    fn write_streak_state(&self, state: &StreakState) -> Result<()> {
        self.kv_set(STREAK_STATE_KEY, &state.encode()?)
    }

    /// `BEGIN IMMEDIATE` takes the write lock up front, so two processes
    /// never both read the counters before either has written them back.
    fn exclusive<T>(&self, pass: impl FnOnce() -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let out = pass()?;
        tx.commit()?;
        Ok(out)
    }
}
