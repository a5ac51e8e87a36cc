use chrono::NaiveDate;
use clap::Subcommand;
use fitstreak_core::{ActivityLog, Config, StreakState};
use serde::Serialize;

use super::{open_engine, print_json, today, CommandResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a completed workout session
    Workout {
        /// Session name
        name: String,
        /// Duration in minutes
        #[arg(long, default_value = "0")]
        minutes: u32,
        /// Day the session happened (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record a nutrition entry
    Nutrition {
        /// Meal or food label
        label: String,
        /// Calories in the entry
        #[arg(long)]
        calories: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record a supplementary exercise set
    Exercise {
        /// Exercise name
        exercise: String,
        /// Repetitions performed
        #[arg(long)]
        reps: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct LogOutput {
    id: i64,
    date: NaiveDate,
    state: StreakState,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

pub fn run(action: LogAction) -> CommandResult {
    let config = Config::load()?;
    let log = ActivityLog::open(config.activity.into())?;

    let (id, date) = match action {
        LogAction::Workout {
            name,
            minutes,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            (log.record_workout(date, &name, minutes)?, date)
        }
        LogAction::Nutrition {
            label,
            calories,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            (log.record_nutrition(date, &label, calories)?, date)
        }
        LogAction::Exercise {
            exercise,
            reps,
            date,
        } => {
            let date = date.unwrap_or_else(today);
            (log.record_exercise(date, &exercise, reps)?, date)
        }
    };

    // Activity for today re-runs today's evaluation so the streak reflects it
    // immediately. Backdated entries only reach days not yet reconciled.
    let today = today();
    let engine = open_engine(&config)?;
    let notice = engine
        .streak_state()
        .last_evaluated_date
        .filter(|last| date < today && date <= *last)
        .map(|last| {
            tracing::info!(%date, %last, "activity recorded for an already reconciled day");
            format!(
                "{date} was already evaluated (through {last}); the entry is stored but that day's status and the streak are unchanged"
            )
        });
    let state = engine.evaluate(today, date == today)?;

    print_json(&LogOutput {
        id,
        date,
        state,
        notice,
    })
}
