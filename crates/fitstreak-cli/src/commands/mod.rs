pub mod config;
pub mod log;
pub mod streak;

use chrono::{Local, NaiveDate};
use fitstreak_core::{ActivityLog, Config, Database, StreakEngine};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Calendar day in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn open_engine(config: &Config) -> Result<StreakEngine<Database, ActivityLog>, Box<dyn std::error::Error>> {
    Ok(StreakEngine::open(config)?)
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
