//! Streak & daily-activity-status engine.
//!
//! Turns a history of activity into one [`DailyStatusRecord`] per calendar
//! day and a live [`StreakState`], with a monthly freeze-token economy and a
//! weekly rest-day quota.
//!
//! - [`StreakEngine::evaluate`] reconciles every day since the previous
//!   evaluation. Idempotent; call it on start-up, after logging activity, or
//!   on a schedule.
//! - [`StreakEngine::mark_rest_day`] admits a user-declared rest day against
//!   the weekly cap and re-evaluates.
//! - [`StreakEngine::observe_streak_state`] and
//!   [`StreakEngine::observe_daily_status_range`] give read-only live views.

pub mod calendar;
mod engine;
mod reconcile;
mod rest_day;
mod state;
mod status;
mod tokens;
mod watch;

pub use engine::StreakEngine;
pub use reconcile::{candidate_status, catch_up_window};
pub use rest_day::RestDayDecision;
pub use state::{StreakState, STATE_FORMAT_VERSION};
pub use status::{DailyStatusRecord, DayStatus};
pub use tokens::{FreezeTokens, Protection};
pub use watch::DailyStatusWatch;
