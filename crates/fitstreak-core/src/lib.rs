//! # fitstreak Core Library
//!
//! This library provides the streak and daily-activity-status engine of the
//! fitstreak training tracker. Every operation is available through the
//! standalone `fitstreak` CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Activity**: [`ActivitySource`] answers how many qualifying activities
//!   (workouts, nutrition entries, supplementary exercise) happened on a date
//! - **Storage**: SQLite-based daily status and streak state storage, and
//!   TOML-based configuration
//! - **Streak**: the evaluation engine, freeze-token economy and rest-day
//!   admission
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: reconciles calendar days into a streak
//! - [`Database`]: daily status and streak state persistence
//! - [`ActivityLog`]: activity persistence and qualifying-activity queries
//! - [`Config`]: application configuration management

pub mod activity;
pub mod error;
pub mod storage;
pub mod streak;

pub use activity::{ActivityLog, ActivitySource, ActivityThresholds};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use storage::{Config, Database, DailyStatusStore, StreakConfig, StreakStateStore, StreakStore};
pub use streak::{
    DailyStatusRecord, DailyStatusWatch, DayStatus, RestDayDecision, StreakEngine, StreakState,
};
