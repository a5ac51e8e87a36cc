//! Streak evaluation service.
//!
//! [`StreakEngine`] owns the durable stores and the activity source behind a
//! single mutex. Every evaluation and every rest-day request runs under that
//! lock, so no two passes interleave their read-modify-write of the
//! counters.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{info, warn};

use super::reconcile::{catch_up_window, Reconciler};
use super::state::StreakState;
use super::status::DailyStatusRecord;
use super::tokens::FreezeTokens;
use super::watch::DailyStatusWatch;
use crate::activity::{ActivityLog, ActivitySource};
use crate::error::{Result, ValidationError};
use crate::storage::{Config, Database, StreakConfig, StreakStore};

pub(crate) struct Collaborators<S, A> {
    pub store: S,
    pub activity: A,
}

/// Outcome of a committed evaluation pass, waiting to be published.
pub(crate) struct Pass {
    pub state: StreakState,
    pub statuses_changed: bool,
}

pub struct StreakEngine<S, A> {
    inner: Mutex<Collaborators<S, A>>,
    policy: StreakConfig,
    state_tx: watch::Sender<StreakState>,
    /// Bumped after every pass that wrote daily status rows.
    status_tx: watch::Sender<u64>,
}

impl StreakEngine<Database, ActivityLog> {
    /// Open the default on-disk stores described by `config`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let store = Database::open()?;
        let activity = ActivityLog::open(config.activity.into())?;
        Ok(Self::new(store, activity, config.streak))
    }
}

impl<S: StreakStore, A: ActivitySource> StreakEngine<S, A> {
    pub fn new(store: S, activity: A, policy: StreakConfig) -> Self {
        let initial = match store.read_streak_state() {
            Ok(Some(state)) => state,
            Ok(None) => StreakState::fresh(policy.monthly_freeze_tokens),
            Err(e) => {
                warn!(error = %e, "streak state unreadable at startup");
                StreakState::fresh(policy.monthly_freeze_tokens)
            }
        };
        let (state_tx, _) = watch::channel(initial);
        let (status_tx, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Collaborators { store, activity }),
            policy,
            state_tx,
            status_tx,
        }
    }

    pub fn policy(&self) -> StreakConfig {
        self.policy
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Collaborators<S, A>> {
        // Collaborators are store handles; a panic mid-pass leaves nothing
        // half-updated in memory.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn reconciler<'a>(&self, c: &'a Collaborators<S, A>) -> Reconciler<'a, S, A> {
        Reconciler {
            store: &c.store,
            activity: &c.activity,
            tokens: FreezeTokens::new(self.policy.monthly_freeze_tokens),
        }
    }

    /// Reconcile every day since the last evaluation through `today` and
    /// return the updated counters.
    ///
    /// Safe to call any number of times. With `force`, `today` is
    /// re-evaluated even if it was already reconciled. A `today` earlier than
    /// the last evaluated day changes nothing, and forcing it is an error.
    ///
    /// # Errors
    /// Returns an error when a durable write fails. The counters are then
    /// left as they were and the next call re-derives the same days.
    pub fn evaluate(&self, today: NaiveDate, force: bool) -> Result<StreakState> {
        let guard = self.lock();
        let c = &*guard;
        let pass = c.store.exclusive(|| self.evaluate_locked(c, today, force))?;
        Ok(self.publish(pass))
    }

    /// One evaluation pass. The caller holds the lock and an exclusive store
    /// scope, and publishes the result once that scope has committed.
    pub(crate) fn evaluate_locked(
        &self,
        c: &Collaborators<S, A>,
        today: NaiveDate,
        force: bool,
    ) -> Result<Pass> {
        let reconciler = self.reconciler(c);
        let mut state = reconciler.load_state();

        if let Some(last) = state.last_evaluated_date {
            if force && today < last {
                return Err(ValidationError::AlreadyReconciled {
                    date: today,
                    evaluated_through: last,
                }
                .into());
            }
        }
        let as_of = state.last_evaluated_date.map_or(today, |last| last.max(today));

        if state.last_evaluated_date.is_none() && state.last_workout_date.is_none() {
            reconciler.bootstrap(&mut state, today);
        }
        if reconciler.tokens.replenish(&mut state, as_of) {
            info!(
                month = state.last_token_reset_month.as_deref().unwrap_or_default(),
                tokens = state.freeze_tokens_remaining,
                "freeze tokens replenished"
            );
        }

        let window = catch_up_window(state.last_evaluated_date, today, force);
        let written = match window {
            Some((start, end)) => reconciler.run_window(&mut state, start, end)?,
            None => Vec::new(),
        };

        match reconciler.rest_days_in_week(as_of) {
            Ok(used) => state.rest_days_used_this_week = used,
            Err(e) => warn!(error = %e, "rest-day tally unavailable, keeping cached value"),
        }

        state.last_evaluated_date = Some(as_of);
        c.store.write_streak_state(&state)?;

        info!(
            %today,
            force,
            days = written.len(),
            current = state.current_streak_days,
            longest = state.longest_streak_days,
            tokens = state.freeze_tokens_remaining,
            "streak evaluated"
        );

        Ok(Pass {
            state,
            statuses_changed: !written.is_empty(),
        })
    }

    pub(crate) fn publish(&self, pass: Pass) -> StreakState {
        self.state_tx.send_replace(pass.state.clone());
        if pass.statuses_changed {
            self.status_tx.send_modify(|revision| *revision += 1);
        }
        pass.state
    }

    /// Last published counters.
    pub fn streak_state(&self) -> StreakState {
        self.state_tx.borrow().clone()
    }

    pub fn daily_status(&self, date: NaiveDate) -> Result<Option<DailyStatusRecord>> {
        self.lock().store.daily_status(date)
    }

    pub fn daily_status_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyStatusRecord>> {
        if end < start {
            return Err(ValidationError::InvalidDateRange { start, end }.into());
        }
        self.lock().store.daily_status_range(start, end)
    }

    /// Live view of the counters. Yields the current value immediately and
    /// a new one after every evaluation.
    pub fn observe_streak_state(&self) -> watch::Receiver<StreakState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn status_revisions(&self) -> watch::Receiver<u64> {
        self.status_tx.subscribe()
    }
}

impl<S, A> StreakEngine<S, A>
where
    S: StreakStore + 'static,
    A: ActivitySource + 'static,
{
    /// Live view of one day's record.
    pub fn observe_daily_status(self: &Arc<Self>, date: NaiveDate) -> Result<DailyStatusWatch<S, A>> {
        self.observe_daily_status_range(date, date)
    }

    /// Live view of the records in `start..=end`.
    pub fn observe_daily_status_range(
        self: &Arc<Self>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailyStatusWatch<S, A>> {
        DailyStatusWatch::new(Arc::clone(self), start, end)
    }
}
