//! Day-by-day reconciliation.
//!
//! Everything here runs with the engine lock held. Reads that fail degrade
//! toward MISSED; writes that fail abort the pass before
//! `last_evaluated_date` moves.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::calendar::{days_inclusive, days_strictly_between, next_day, previous_day, week_bounds};
use super::state::StreakState;
use super::status::{DailyStatusRecord, DayStatus};
use super::tokens::{FreezeTokens, Protection};
use crate::activity::ActivitySource;
use crate::error::Result;
use crate::storage::StreakStore;

/// Status implied by the day's activity and whatever is already on disk,
/// before the token economy gets a say.
pub fn candidate_status(activity_count: u32, existing: Option<DayStatus>) -> DayStatus {
    if activity_count > 0 || existing == Some(DayStatus::Workout) {
        return DayStatus::Workout;
    }
    match existing {
        Some(DayStatus::Rest) => DayStatus::Rest,
        Some(DayStatus::Frozen) => DayStatus::Frozen,
        _ => DayStatus::Missed,
    }
}

/// Inclusive range of dates a pass must reconcile, or `None` when already
/// up to date.
///
/// A forced pass re-runs `today` when it is the last evaluated day and still
/// covers any days left over from an earlier, unfinished catch-up. Days
/// before the last evaluated one are never reopened.
pub fn catch_up_window(
    last_evaluated: Option<NaiveDate>,
    today: NaiveDate,
    force: bool,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = match last_evaluated {
        Some(last) if last > today => return None,
        Some(last) if force && last == today => today,
        Some(last) => next_day(last)?,
        None => today,
    };
    (start <= today).then_some((start, today))
}

pub(crate) struct Reconciler<'a, S, A> {
    pub store: &'a S,
    pub activity: &'a A,
    pub tokens: FreezeTokens,
}

impl<S: StreakStore, A: ActivitySource> Reconciler<'_, S, A> {
    /// Persisted state, or a fresh one when missing or unreadable.
    pub fn load_state(&self) -> StreakState {
        match self.store.read_streak_state() {
            Ok(Some(state)) => state,
            Ok(None) => StreakState::fresh(self.tokens.monthly_allotment()),
            Err(e) => {
                warn!(error = %e, "streak state unreadable, treating as first run");
                StreakState::fresh(self.tokens.monthly_allotment())
            }
        }
    }

    /// Seed the streak from activity history on the very first pass.
    ///
    /// Only days strictly before `first_day` count: that day and everything
    /// after it is reconciled by the pass itself. The seeded run is kept only
    /// when it ends the day before `first_day`.
    pub fn bootstrap(&self, state: &mut StreakState, first_day: NaiveDate) {
        let dates = match self.activity.distinct_activity_dates() {
            Ok(dates) => dates,
            Err(e) => {
                warn!(error = %e, "activity history unavailable, skipping bootstrap");
                return;
            }
        };

        let mut history = dates.into_iter().filter(|d| *d < first_day);
        let Some(latest) = history.next() else {
            return;
        };

        if Some(latest) == previous_day(first_day) {
            let mut streak = 1u32;
            let mut expected = previous_day(latest);
            for date in history {
                if Some(date) != expected {
                    break;
                }
                streak += 1;
                expected = previous_day(date);
            }
            state.current_streak_days = streak;
        }

        state.last_workout_date = Some(latest);
        state.raise_watermark();
        debug!(
            %latest,
            current = state.current_streak_days,
            "bootstrapped streak from activity history"
        );
    }

    /// Reconcile every date in `start..=end`, ascending.
    pub fn run_window(
        &self,
        state: &mut StreakState,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>> {
        let mut written = Vec::new();
        for date in days_inclusive(start, end) {
            written.push(self.reconcile_day(state, date)?);
        }
        Ok(written)
    }

    pub fn reconcile_day(&self, state: &mut StreakState, date: NaiveDate) -> Result<DailyStatusRecord> {
        let activity_count = match self.activity.activity_count_for_date(date) {
            Ok(count) => count,
            Err(e) => {
                warn!(%date, error = %e, "activity count unavailable, assuming none");
                0
            }
        };
        let existing = match self.store.daily_status(date) {
            Ok(record) => record.map(|r| r.status),
            Err(e) => {
                warn!(%date, error = %e, "daily status unreadable, assuming missed");
                None
            }
        };

        let status = match candidate_status(activity_count, existing) {
            DayStatus::Workout => {
                self.apply_workout(state, date);
                DayStatus::Workout
            }
            DayStatus::Rest => DayStatus::Rest,
            DayStatus::Frozen => {
                self.tokens.acknowledge(state, date);
                DayStatus::Frozen
            }
            DayStatus::Missed => match self.tokens.protect(state, date) {
                Protection::Spent => {
                    debug!(%date, remaining = state.freeze_tokens_remaining, "freeze token spent");
                    DayStatus::Frozen
                }
                // Paid for by an earlier pass whose FROZEN row was since lost.
                Protection::AlreadyProtected => DayStatus::Frozen,
                Protection::NothingToProtect => DayStatus::Missed,
                Protection::Exhausted => {
                    debug!(%date, lost = state.current_streak_days, "streak broken");
                    state.current_streak_days = 0;
                    DayStatus::Missed
                }
            },
        };

        let record = DailyStatusRecord::new(date, status, activity_count);
        self.store.upsert_daily_status(&record)?;
        debug!(%date, %status, activity_count, streak = state.current_streak_days, "day reconciled");
        Ok(record)
    }

    fn apply_workout(&self, state: &mut StreakState, date: NaiveDate) {
        let current = state.current_streak_days;
        let next = match state.last_workout_date {
            None => 1,
            Some(last) if last >= date => current.max(1),
            Some(last) if Some(last) == previous_day(date) => current + 1,
            Some(last) if current > 0 && self.gap_is_bridged(last, date) => current + 1,
            Some(_) => 1,
        };
        state.current_streak_days = next;
        if state.last_workout_date.map_or(true, |last| last < date) {
            state.last_workout_date = Some(date);
        }
        state.raise_watermark();
    }

    /// Whether every day strictly between two workouts is REST or FROZEN.
    fn gap_is_bridged(&self, last_workout: NaiveDate, date: NaiveDate) -> bool {
        let (Some(from), Some(to)) = (next_day(last_workout), previous_day(date)) else {
            return false;
        };
        let gap = days_strictly_between(last_workout, date);
        let covered = DayStatus::ALL
            .into_iter()
            .filter(DayStatus::bridges_streak)
            .map(|status| self.store.count_status_in_range(status, from, to))
            .try_fold(0i64, |acc, count| count.map(|c| acc + i64::from(c)));
        match covered {
            Ok(covered) => covered >= gap,
            Err(e) => {
                warn!(error = %e, "cannot inspect gap, treating as broken");
                false
            }
        }
    }

    /// REST records in the Monday-start week containing `today`.
    pub fn rest_days_in_week(&self, today: NaiveDate) -> Result<u32> {
        let (monday, sunday) = week_bounds(today);
        self.store.count_status_in_range(DayStatus::Rest, monday, sunday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    #[test]
    fn activity_or_workout_record_wins() {
        assert_eq!(candidate_status(2, None), DayStatus::Workout);
        assert_eq!(candidate_status(1, Some(DayStatus::Rest)), DayStatus::Workout);
        assert_eq!(candidate_status(0, Some(DayStatus::Workout)), DayStatus::Workout);
    }

    #[test]
    fn existing_rest_then_frozen_then_missed() {
        assert_eq!(candidate_status(0, Some(DayStatus::Rest)), DayStatus::Rest);
        assert_eq!(candidate_status(0, Some(DayStatus::Frozen)), DayStatus::Frozen);
        assert_eq!(candidate_status(0, Some(DayStatus::Missed)), DayStatus::Missed);
        assert_eq!(candidate_status(0, None), DayStatus::Missed);
    }

    #[test]
    fn window_starts_after_last_evaluation() {
        assert_eq!(catch_up_window(Some(d(3)), d(6), false), Some((d(4), d(6))));
    }

    #[test]
    fn first_run_covers_today_only() {
        assert_eq!(catch_up_window(None, d(6), false), Some((d(6), d(6))));
        assert_eq!(catch_up_window(None, d(6), true), Some((d(6), d(6))));
    }

    #[test]
    fn up_to_date_skips_unless_forced() {
        assert_eq!(catch_up_window(Some(d(6)), d(6), false), None);
        assert_eq!(catch_up_window(Some(d(6)), d(6), true), Some((d(6), d(6))));
    }

    #[test]
    fn forced_pass_keeps_pending_catch_up() {
        assert_eq!(catch_up_window(Some(d(2)), d(6), true), Some((d(3), d(6))));
    }

    #[test]
    fn evaluated_ahead_of_today() {
        assert_eq!(catch_up_window(Some(d(9)), d(6), false), None);
        assert_eq!(catch_up_window(Some(d(9)), d(6), true), None);
    }
}
