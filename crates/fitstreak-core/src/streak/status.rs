//! Per-day status records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// At least one qualifying activity was logged.
    Workout,
    /// User-declared rest day, admitted against the weekly quota.
    Rest,
    /// Missed day covered by a freeze token.
    Frozen,
    /// No activity and no protection.
    Missed,
}

impl DayStatus {
    /// Tag written to the `daily_status.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Workout => "workout",
            DayStatus::Rest => "rest",
            DayStatus::Frozen => "frozen",
            DayStatus::Missed => "missed",
        }
    }

    /// Parse a stored tag. Returns `None` for anything unrecognised.
    ///
    /// Upper-case tags written by older schema versions are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "workout" => Some(DayStatus::Workout),
            "rest" => Some(DayStatus::Rest),
            "frozen" => Some(DayStatus::Frozen),
            "missed" => Some(DayStatus::Missed),
            _ => None,
        }
    }

    /// Decode a stored tag, falling back to [`DayStatus::Missed`].
    pub fn decode_or_missed(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::warn!(value = raw, "unrecognised day status, treating as missed");
            DayStatus::Missed
        })
    }

    pub const ALL: [DayStatus; 4] = [
        DayStatus::Workout,
        DayStatus::Rest,
        DayStatus::Frozen,
        DayStatus::Missed,
    ];

    /// Whether this status keeps a running streak alive without extending it.
    pub fn bridges_streak(&self) -> bool {
        matches!(self, DayStatus::Rest | DayStatus::Frozen)
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the daily status store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatusRecord {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub activity_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl DailyStatusRecord {
    pub fn new(date: NaiveDate, status: DayStatus, activity_count: u32) -> Self {
        Self {
            date,
            status,
            activity_count,
            updated_at: Utc::now(),
        }
    }
}
