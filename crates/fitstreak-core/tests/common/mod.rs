//! Shared fixtures for the streak integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use fitstreak_core::error::Result;
use fitstreak_core::{
    ActivitySource, CoreError, DailyStatusRecord, DailyStatusStore, Database, DayStatus,
    StreakConfig, StreakEngine, StreakState, StreakStateStore,
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Activity source whose per-date counts and failures are set by the test.
#[derive(Default)]
pub struct ScriptedActivity {
    counts: Mutex<BTreeMap<NaiveDate, u32>>,
    failing: Mutex<BTreeSet<NaiveDate>>,
}

impl ScriptedActivity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, date: NaiveDate, count: u32) {
        self.counts.lock().unwrap().insert(date, count);
    }

    pub fn workout_on(&self, dates: &[NaiveDate]) {
        for date in dates {
            self.set(*date, 1);
        }
    }

    pub fn fail_on(&self, date: NaiveDate) {
        self.failing.lock().unwrap().insert(date);
    }
}

impl ActivitySource for ScriptedActivity {
    fn activity_count_for_date(&self, date: NaiveDate) -> Result<u32> {
        if self.failing.lock().unwrap().contains(&date) {
            return Err(CoreError::Custom(format!("activity backend down for {date}")));
        }
        Ok(self.counts.lock().unwrap().get(&date).copied().unwrap_or(0))
    }

    fn distinct_activity_dates(&self) -> Result<Vec<NaiveDate>> {
        let counts = self.counts.lock().unwrap();
        Ok(counts
            .iter()
            .rev()
            .filter(|(_, count)| **count > 0)
            .map(|(date, _)| *date)
            .collect())
    }
}

/// Store that can be told to reject daily status writes.
pub struct FlakyStore {
    pub db: Database,
    pub fail_upserts: Arc<AtomicBool>,
}

impl DailyStatusStore for FlakyStore {
    fn upsert_daily_status(&self, record: &DailyStatusRecord) -> Result<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(CoreError::Custom("disk full".into()));
        }
        self.db.upsert_daily_status(record)
    }

    fn daily_status(&self, date: NaiveDate) -> Result<Option<DailyStatusRecord>> {
        self.db.daily_status(date)
    }

    fn count_status_in_range(&self, status: DayStatus, start: NaiveDate, end: NaiveDate) -> Result<u32> {
        self.db.count_status_in_range(status, start, end)
    }

    fn daily_status_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyStatusRecord>> {
        self.db.daily_status_range(start, end)
    }
}

impl StreakStateStore for FlakyStore {
    fn read_streak_state(&self) -> Result<Option<StreakState>> {
        self.db.read_streak_state()
    }

    fn write_streak_state(&self, state: &StreakState) -> Result<()> {
        self.db.write_streak_state(state)
    }

    fn exclusive<T>(&self, pass: impl FnOnce() -> Result<T>) -> Result<T> {
        self.db.exclusive(pass)
    }
}

pub type TestEngine = StreakEngine<Database, Arc<ScriptedActivity>>;

pub fn engine_with(policy: StreakConfig) -> (Arc<TestEngine>, Arc<ScriptedActivity>) {
    let activity = ScriptedActivity::new();
    let engine = StreakEngine::new(Database::open_memory().unwrap(), Arc::clone(&activity), policy);
    (Arc::new(engine), activity)
}

pub fn engine() -> (Arc<TestEngine>, Arc<ScriptedActivity>) {
    engine_with(StreakConfig::default())
}

pub fn status_of(engine: &TestEngine, date: NaiveDate) -> Option<DayStatus> {
    engine.daily_status(date).unwrap().map(|r| r.status)
}
