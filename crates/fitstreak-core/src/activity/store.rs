//! SQLite-backed activity log.
//!
//! Three tables feed the streak:
//! - `workout_sessions`: every logged session qualifies
//! - `nutrition_entries`: qualifies at or above a calorie threshold
//! - `exercise_logs`: supplementary sets (pull-ups etc.), qualifies at or
//!   above a rep threshold

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::ActivitySource;
use crate::error::{DatabaseError, Result};
use crate::storage::database::DATE_FORMAT;
use crate::storage::{data_dir, migrations, ActivityConfig};

/// What counts as a qualifying nutrition entry or exercise log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityThresholds {
    pub nutrition_min_calories: u32,
    pub exercise_min_reps: u32,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        ActivityConfig::default().into()
    }
}

impl From<ActivityConfig> for ActivityThresholds {
    fn from(cfg: ActivityConfig) -> Self {
        Self {
            nutrition_min_calories: cfg.nutrition_min_calories,
            // Zero-rep sets never qualify.
            exercise_min_reps: cfg.exercise_min_reps.max(1),
        }
    }
}

pub struct ActivityLog {
    conn: Connection,
    thresholds: ActivityThresholds,
}

impl ActivityLog {
    /// Open the activity log inside `<data dir>/fitstreak.db`.
    pub fn open(thresholds: ActivityThresholds) -> Result<Self> {
        let path = data_dir()?.join("fitstreak.db");
        Self::open_at(&path, thresholds)
    }

    pub fn open_at(path: &Path, thresholds: ActivityThresholds) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn, thresholds)
    }

    /// Open an in-memory log (tests and dry runs).
    pub fn open_memory(thresholds: ActivityThresholds) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn, thresholds)
    }

    fn from_connection(conn: Connection, thresholds: ActivityThresholds) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn, thresholds })
    }

    pub fn thresholds(&self) -> ActivityThresholds {
        self.thresholds
    }

    /// Log a workout session.
    pub fn record_workout(&self, date: NaiveDate, name: &str, duration_min: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO workout_sessions (performed_on, name, duration_min, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![date_key(date), name, duration_min, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Log a nutrition entry. Entries below the calorie threshold are stored
    /// but do not count.
    pub fn record_nutrition(&self, date: NaiveDate, label: &str, calories: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO nutrition_entries (performed_on, label, calories, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![date_key(date), label, calories, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Log a supplementary exercise set.
    pub fn record_exercise(&self, date: NaiveDate, exercise: &str, reps: u32) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercise_logs (performed_on, exercise, reps, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![date_key(date), exercise, reps, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl ActivitySource for ActivityLog {
    fn activity_count_for_date(&self, date: NaiveDate) -> Result<u32> {
        let count: i64 = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM workout_sessions WHERE performed_on = ?1)
              + (SELECT COUNT(*) FROM nutrition_entries WHERE performed_on = ?1 AND calories >= ?2)
              + (SELECT COUNT(*) FROM exercise_logs WHERE performed_on = ?1 AND reps >= ?3)",
            params![
                date_key(date),
                self.thresholds.nutrition_min_calories,
                self.thresholds.exercise_min_reps,
            ],
            |row| row.get(0),
        )?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn has_any_qualifying_activity(&self, date: NaiveDate) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM workout_sessions WHERE performed_on = ?1)
                 OR EXISTS(SELECT 1 FROM nutrition_entries WHERE performed_on = ?1 AND calories >= ?2)
                 OR EXISTS(SELECT 1 FROM exercise_logs WHERE performed_on = ?1 AND reps >= ?3)",
            params![
                date_key(date),
                self.thresholds.nutrition_min_calories,
                self.thresholds.exercise_min_reps,
            ],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn distinct_activity_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT performed_on FROM workout_sessions
             UNION
             SELECT performed_on FROM nutrition_entries WHERE calories >= ?1
             UNION
             SELECT performed_on FROM exercise_logs WHERE reps >= ?2
             ORDER BY 1 DESC",
        )?;
        let rows = stmt.query_map(
            params![
                self.thresholds.nutrition_min_calories,
                self.thresholds.exercise_min_reps,
            ],
            |row| row.get::<_, String>(0),
        )?;

        let mut dates = Vec::new();
        for row in rows {
            let raw = row?;
            match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => dates.push(date),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "skipping activity row with invalid date");
                }
            }
        }
        Ok(dates)
    }
}
