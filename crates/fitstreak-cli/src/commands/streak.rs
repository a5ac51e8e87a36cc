use chrono::NaiveDate;
use fitstreak_core::streak::calendar::week_bounds;
use fitstreak_core::Config;
use serde::Serialize;

use super::{open_engine, print_json, today, CommandResult};

pub fn status() -> CommandResult {
    let config = Config::load()?;
    let engine = open_engine(&config)?;
    let state = engine.evaluate(today(), false)?;
    print_json(&state)
}

pub fn evaluate(date: Option<NaiveDate>, force: bool) -> CommandResult {
    let config = Config::load()?;
    let engine = open_engine(&config)?;
    let state = engine.evaluate(date.unwrap_or_else(today), force)?;
    print_json(&state)
}

#[derive(Serialize)]
struct RestOutput {
    date: NaiveDate,
    #[serde(flatten)]
    decision: fitstreak_core::RestDayDecision,
    rest_days_used_this_week: u32,
}

/// A denied request still exits 0: denial is a policy outcome.
pub fn rest(date: Option<NaiveDate>) -> CommandResult {
    let config = Config::load()?;
    let engine = open_engine(&config)?;
    let date = date.unwrap_or_else(today);
    let decision = engine.mark_rest_day_detailed(date)?;
    print_json(&RestOutput {
        date,
        decision,
        rest_days_used_this_week: engine.streak_state().rest_days_used_this_week,
    })
}

pub fn calendar(from: Option<NaiveDate>, to: Option<NaiveDate>) -> CommandResult {
    let config = Config::load()?;
    let engine = open_engine(&config)?;
    let (monday, sunday) = week_bounds(today());
    let records = engine.daily_status_range(from.unwrap_or(monday), to.unwrap_or(sunday))?;
    print_json(&records)
}
