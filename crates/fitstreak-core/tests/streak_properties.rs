//! Property tests over random activity histories and evaluation schedules.

mod common;

use common::{d, engine_with};
use fitstreak_core::{DayStatus, StreakConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Day {
    active: bool,
    evaluate: bool,
    force: bool,
    rest: bool,
}

fn day() -> impl Strategy<Value = Day> {
    (any::<bool>(), prop::bool::weighted(0.7), prop::bool::weighted(0.2), prop::bool::weighted(0.15))
        .prop_map(|(active, evaluate, force, rest)| Day {
            active,
            evaluate,
            force,
            rest,
        })
}

fn policy() -> impl Strategy<Value = StreakConfig> {
    (0u32..=3, 0u32..=3).prop_map(|(monthly_freeze_tokens, weekly_rest_days)| StreakConfig {
        monthly_freeze_tokens,
        weekly_rest_days,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Longest streak never drops, tokens stay within the allotment, and
    /// every FROZEN day is paid for by a token from this month.
    #[test]
    fn counters_respect_invariants(policy in policy(), days in prop::collection::vec(day(), 1..=31)) {
        let (engine, activity) = engine_with(policy);
        let mut longest = 0;

        for (i, plan) in days.iter().enumerate() {
            let date = d(2024, 1, i as u32 + 1);
            if plan.active {
                activity.set(date, 1);
            }
            if plan.rest && !plan.active {
                engine.mark_rest_day(date).unwrap();
            }
            if plan.evaluate {
                let state = engine.evaluate(date, plan.force).unwrap();

                prop_assert!(state.longest_streak_days >= longest);
                prop_assert!(state.longest_streak_days >= state.current_streak_days);
                prop_assert!(state.freeze_tokens_remaining <= policy.monthly_freeze_tokens);
                longest = state.longest_streak_days;

                let frozen = engine
                    .daily_status_range(d(2024, 1, 1), date)
                    .unwrap()
                    .iter()
                    .filter(|r| r.status == DayStatus::Frozen)
                    .count() as u32;
                prop_assert!(frozen + state.freeze_tokens_remaining <= policy.monthly_freeze_tokens);
            }
        }
    }

    /// A second non-forced evaluation of the same day changes nothing.
    #[test]
    fn repeated_evaluation_is_stable(policy in policy(), days in prop::collection::vec(day(), 1..=20)) {
        let (engine, activity) = engine_with(policy);

        for (i, plan) in days.iter().enumerate() {
            let date = d(2024, 1, i as u32 + 1);
            if plan.active {
                activity.set(date, 1);
            }
            if plan.evaluate {
                let first = engine.evaluate(date, plan.force).unwrap();
                let second = engine.evaluate(date, false).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }

    /// Every reconciled day has exactly one record, and WORKOUT records
    /// always carry activity.
    #[test]
    fn one_record_per_reconciled_day(days in prop::collection::vec(day(), 1..=31)) {
        let (engine, activity) = engine_with(StreakConfig::default());
        let mut first_evaluated = None;
        let mut last = None;

        for (i, plan) in days.iter().enumerate() {
            let date = d(2024, 1, i as u32 + 1);
            if plan.active {
                activity.set(date, 1);
            }
            if plan.evaluate {
                engine.evaluate(date, plan.force).unwrap();
                first_evaluated.get_or_insert(date);
                last = Some(date);
            }
        }

        if let (Some(first), Some(last)) = (first_evaluated, last) {
            let records = engine.daily_status_range(first, last).unwrap();
            prop_assert_eq!(records.len() as i64, (last - first).num_days() + 1);
            for record in records {
                if record.status == DayStatus::Workout {
                    prop_assert!(record.activity_count > 0);
                }
            }
        }
    }
}
