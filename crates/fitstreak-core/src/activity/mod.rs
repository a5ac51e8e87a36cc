//! Qualifying-activity queries.
//!
//! The streak engine never looks at workouts, meals or exercise logs
//! directly. It asks an [`ActivitySource`] how many qualifying activities
//! happened on a date. [`ActivityLog`] is the SQLite-backed source.

mod store;

pub use store::{ActivityLog, ActivityThresholds};

use chrono::NaiveDate;

use crate::error::Result;

/// Read-only view over everything that counts as "trained today".
pub trait ActivitySource: Send {
    /// Sum of qualifying workout sessions, nutrition entries and
    /// supplementary exercise logs on `date`.
    fn activity_count_for_date(&self, date: NaiveDate) -> Result<u32>;

    /// Fast existence check.
    fn has_any_qualifying_activity(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.activity_count_for_date(date)? > 0)
    }

    /// Every date with at least one qualifying activity, most recent first.
    fn distinct_activity_dates(&self) -> Result<Vec<NaiveDate>>;
}

impl<T: ActivitySource + Sync> ActivitySource for std::sync::Arc<T> {
    fn activity_count_for_date(&self, date: NaiveDate) -> Result<u32> {
        (**self).activity_count_for_date(date)
    }

    fn has_any_qualifying_activity(&self, date: NaiveDate) -> Result<bool> {
        (**self).has_any_qualifying_activity(date)
    }

    fn distinct_activity_dates(&self) -> Result<Vec<NaiveDate>> {
        (**self).distinct_activity_dates()
    }
}
