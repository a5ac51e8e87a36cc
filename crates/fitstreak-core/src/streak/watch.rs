//! Live views over daily status records for calendar front-ends.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;

use super::engine::StreakEngine;
use super::status::DailyStatusRecord;
use crate::activity::ActivitySource;
use crate::error::{CoreError, Result};
use crate::storage::StreakStore;

/// Snapshot of the records in a date range that refreshes whenever an
/// evaluation rewrites rows inside it.
pub struct DailyStatusWatch<S, A> {
    engine: Arc<StreakEngine<S, A>>,
    revisions: watch::Receiver<u64>,
    start: NaiveDate,
    end: NaiveDate,
    current: Vec<DailyStatusRecord>,
}

impl<S, A> DailyStatusWatch<S, A>
where
    S: StreakStore + 'static,
    A: ActivitySource + 'static,
{
    pub(crate) fn new(engine: Arc<StreakEngine<S, A>>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let revisions = engine.status_revisions();
        let current = engine.daily_status_range(start, end)?;
        Ok(Self {
            engine,
            revisions,
            start,
            end,
            current,
        })
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    /// Records as of the last refresh, ascending by date.
    pub fn current(&self) -> &[DailyStatusRecord] {
        &self.current
    }

    pub fn record(&self, date: NaiveDate) -> Option<&DailyStatusRecord> {
        self.current.iter().find(|r| r.date == date)
    }

    /// Wait until a pass rewrites a record inside the range, then return the
    /// refreshed snapshot. Writes outside the range are skipped.
    pub async fn changed(&mut self) -> Result<&[DailyStatusRecord]> {
        loop {
            self.revisions
                .changed()
                .await
                .map_err(|_| CoreError::Custom("streak engine shut down".into()))?;
            let fresh = self.engine.daily_status_range(self.start, self.end)?;
            if fresh != self.current {
                self.current = fresh;
                return Ok(&self.current);
            }
        }
    }
}
