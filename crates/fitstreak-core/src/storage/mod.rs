mod config;
pub mod database;
pub mod migrations;

pub use config::{ActivityConfig, Config, LoggingConfig, StreakConfig};
pub use database::Database;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::streak::{DailyStatusRecord, DayStatus, StreakState};

/// Durable per-date status records. One row per date, upsert only.
pub trait DailyStatusStore: Send {
    fn upsert_daily_status(&self, record: &DailyStatusRecord) -> Result<()>;

    /// Record for `date`, if any. Unreadable status tags come back as
    /// [`DayStatus::Missed`].
    fn daily_status(&self, date: NaiveDate) -> Result<Option<DailyStatusRecord>>;

    /// Number of records with `status` in `start..=end`.
    fn count_status_in_range(&self, status: DayStatus, start: NaiveDate, end: NaiveDate)
        -> Result<u32>;

    /// Records in `start..=end`, ascending by date.
    fn daily_status_range(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<DailyStatusRecord>>;
}

/// Durable singleton holding the streak counters.
pub trait StreakStateStore: Send {
    /// `None` when nothing was persisted or the stored value is unreadable.
    fn read_streak_state(&self) -> Result<Option<StreakState>>;

    fn write_streak_state(&self, state: &StreakState) -> Result<()>;

    /// Run one read-modify-write pass with exclusive write access, so that
    /// passes from other connections to the same store cannot interleave.
    /// Everything `pass` wrote is discarded when it fails.
    fn exclusive<T>(&self, pass: impl FnOnce() -> Result<T>) -> Result<T> {
        pass()
    }
}

/// Everything the engine needs from durable storage.
pub trait StreakStore: DailyStatusStore + StreakStateStore {}

impl<T: DailyStatusStore + StreakStateStore> StreakStore for T {}

/// Returns the data directory.
///
/// Resolution order: `FITSTREAK_DATA_DIR`, then `~/.config/fitstreak-dev/`
/// when `FITSTREAK_ENV=dev`, then `~/.config/fitstreak/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FITSTREAK_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FITSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("fitstreak-dev")
            } else {
                base_dir.join("fitstreak")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
