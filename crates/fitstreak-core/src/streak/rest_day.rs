//! Rest-day admission.
//!
//! A user may declare a day as REST, up to a weekly cap. Days with real
//! activity can never be downgraded. Every admitted request is followed by
//! one forced evaluation so the counters and the weekly tally pick up the
//! new row immediately.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::engine::{Collaborators, Pass, StreakEngine};
use super::status::{DailyStatusRecord, DayStatus};
use crate::activity::ActivitySource;
use crate::error::{Result, ValidationError};
use crate::storage::StreakStore;

/// Outcome of a rest-day request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RestDayDecision {
    /// A new REST record was written.
    Marked,
    /// The day was already REST; nothing new was charged to the quota.
    AlreadyRest,
    /// The day has qualifying activity.
    DeniedHasActivity,
    /// The week's quota is used up.
    DeniedQuotaReached { used: u32, cap: u32 },
}

impl RestDayDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RestDayDecision::Marked | RestDayDecision::AlreadyRest)
    }
}

impl<S: StreakStore, A: ActivitySource> StreakEngine<S, A> {
    /// Mark `today` as a rest day.
    ///
    /// Returns `true` when the day was marked or already was REST, `false`
    /// when the request was denied.
    pub fn mark_rest_day(&self, today: NaiveDate) -> Result<bool> {
        Ok(self.mark_rest_day_detailed(today)?.is_admitted())
    }

    /// Like [`mark_rest_day`](Self::mark_rest_day), with the reason.
    ///
    /// # Errors
    /// Fails for a day before the last evaluated one, unless it already is
    /// REST, and when a durable write fails.
    pub fn mark_rest_day_detailed(&self, today: NaiveDate) -> Result<RestDayDecision> {
        let guard = self.lock();
        let c = &*guard;
        let (decision, pass) = c.store.exclusive(|| self.admit_rest_day(c, today))?;
        if let Some(pass) = pass {
            self.publish(pass);
        }
        Ok(decision)
    }

    fn admit_rest_day(
        &self,
        c: &Collaborators<S, A>,
        today: NaiveDate,
    ) -> Result<(RestDayDecision, Option<Pass>)> {
        let has_activity = c.activity.has_any_qualifying_activity(today).unwrap_or_else(|e| {
            warn!(%today, error = %e, "activity check failed, assuming none");
            false
        });
        if has_activity {
            info!(%today, "rest day denied: activity already logged");
            return Ok((RestDayDecision::DeniedHasActivity, None));
        }

        let existing = match c.store.daily_status(today) {
            Ok(record) => record.map(|r| r.status),
            Err(e) => {
                warn!(%today, error = %e, "daily status unreadable, assuming none");
                None
            }
        };
        let reconciler = self.reconciler(c);
        let evaluated_through = reconciler
            .load_state()
            .last_evaluated_date
            .filter(|last| today < *last);

        if existing == Some(DayStatus::Rest) {
            if evaluated_through.is_some() {
                return Ok((RestDayDecision::AlreadyRest, None));
            }
            let pass = self.evaluate_locked(c, today, true)?;
            return Ok((RestDayDecision::AlreadyRest, Some(pass)));
        }
        if let Some(last) = evaluated_through {
            return Err(ValidationError::AlreadyReconciled {
                date: today,
                evaluated_through: last,
            }
            .into());
        }

        let cap = self.policy().weekly_rest_days;
        let used = reconciler.rest_days_in_week(today)?;
        if used >= cap {
            info!(%today, used, cap, "rest day denied: weekly quota reached");
            return Ok((RestDayDecision::DeniedQuotaReached { used, cap }, None));
        }

        c.store
            .upsert_daily_status(&DailyStatusRecord::new(today, DayStatus::Rest, 0))?;
        let pass = self.evaluate_locked(c, today, true)?;
        info!(%today, used = used + 1, cap, "rest day marked");
        Ok((RestDayDecision::Marked, Some(pass)))
    }
}
