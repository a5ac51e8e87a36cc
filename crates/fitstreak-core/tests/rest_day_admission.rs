//! Integration tests for rest-day admission.

mod common;

use common::{d, engine, engine_with, status_of};
use fitstreak_core::{DayStatus, RestDayDecision, StreakConfig};

// 2024-03-11 is a Monday; the week runs through Sunday 2024-03-17.

#[test]
fn third_rest_day_in_a_week_is_denied() {
    let (engine, _activity) = engine();
    assert!(engine.mark_rest_day(d(2024, 3, 11)).unwrap());
    assert!(engine.mark_rest_day(d(2024, 3, 12)).unwrap());
    let before = engine.streak_state();

    let admitted = engine.mark_rest_day(d(2024, 3, 13)).unwrap();

    assert!(!admitted);
    assert_eq!(status_of(&engine, d(2024, 3, 13)), None);
    assert_eq!(engine.streak_state(), before);
}

#[test]
fn denial_reports_usage() {
    let (engine, _activity) = engine();
    engine.mark_rest_day(d(2024, 3, 11)).unwrap();
    engine.mark_rest_day(d(2024, 3, 12)).unwrap();

    let decision = engine.mark_rest_day_detailed(d(2024, 3, 15)).unwrap();

    assert_eq!(decision, RestDayDecision::DeniedQuotaReached { used: 2, cap: 2 });
}

#[test]
fn quota_resets_on_monday() {
    let (engine, _activity) = engine();
    engine.mark_rest_day(d(2024, 3, 16)).unwrap();
    engine.mark_rest_day(d(2024, 3, 17)).unwrap();

    assert_eq!(
        engine.mark_rest_day_detailed(d(2024, 3, 18)).unwrap(),
        RestDayDecision::Marked
    );
}

#[test]
fn day_with_activity_cannot_rest() {
    let (engine, activity) = engine();
    activity.set(d(2024, 3, 12), 1);

    let decision = engine.mark_rest_day_detailed(d(2024, 3, 12)).unwrap();

    assert_eq!(decision, RestDayDecision::DeniedHasActivity);
    assert_eq!(status_of(&engine, d(2024, 3, 12)), None);
}

#[test]
fn repeat_request_is_idempotent_and_free() {
    let (engine, _activity) = engine();
    assert_eq!(
        engine.mark_rest_day_detailed(d(2024, 3, 11)).unwrap(),
        RestDayDecision::Marked
    );
    engine.mark_rest_day(d(2024, 3, 12)).unwrap();

    // Quota is full, yet re-marking an existing rest day still succeeds
    assert_eq!(
        engine.mark_rest_day_detailed(d(2024, 3, 12)).unwrap(),
        RestDayDecision::AlreadyRest
    );
    assert_eq!(engine.streak_state().rest_days_used_this_week, 2);
}

#[test]
fn admitted_rest_day_is_evaluated_immediately() {
    let (engine, activity) = engine();
    activity.workout_on(&[d(2024, 3, 11), d(2024, 3, 12)]);
    engine.evaluate(d(2024, 3, 12), false).unwrap();

    assert!(engine.mark_rest_day(d(2024, 3, 13)).unwrap());

    let state = engine.streak_state();
    assert_eq!(state.last_evaluated_date, Some(d(2024, 3, 13)));
    assert_eq!(state.rest_days_used_this_week, 1);
    assert_eq!(state.current_streak_days, 2);
    // No token was needed
    assert_eq!(state.freeze_tokens_remaining, 2);
    assert_eq!(status_of(&engine, d(2024, 3, 13)), Some(DayStatus::Rest));
}

#[test]
fn rest_day_bridges_the_streak() {
    let (engine, activity) = engine();
    activity.workout_on(&[d(2024, 3, 11), d(2024, 3, 12), d(2024, 3, 14)]);
    engine.evaluate(d(2024, 3, 12), false).unwrap();
    engine.mark_rest_day(d(2024, 3, 13)).unwrap();

    let state = engine.evaluate(d(2024, 3, 14), false).unwrap();

    assert_eq!(state.current_streak_days, 3);
    assert_eq!(state.longest_streak_days, 3);
}

#[test]
fn activity_after_rest_turns_the_day_into_a_workout() {
    let (engine, activity) = engine();
    activity.workout_on(&[d(2024, 3, 11)]);
    engine.evaluate(d(2024, 3, 11), false).unwrap();
    engine.mark_rest_day(d(2024, 3, 12)).unwrap();

    activity.set(d(2024, 3, 12), 1);
    let state = engine.evaluate(d(2024, 3, 12), true).unwrap();

    assert_eq!(status_of(&engine, d(2024, 3, 12)), Some(DayStatus::Workout));
    assert_eq!(state.current_streak_days, 2);
    assert_eq!(state.rest_days_used_this_week, 0);
}

#[test]
fn zero_cap_denies_everything() {
    let (engine, _activity) = engine_with(StreakConfig {
        weekly_rest_days: 0,
        ..StreakConfig::default()
    });

    assert!(!engine.mark_rest_day(d(2024, 3, 11)).unwrap());
}

#[test]
fn failing_activity_check_does_not_block_rest() {
    let (engine, activity) = engine();
    activity.fail_on(d(2024, 3, 11));

    assert!(engine.mark_rest_day(d(2024, 3, 11)).unwrap());
    assert_eq!(status_of(&engine, d(2024, 3, 11)), Some(DayStatus::Rest));
}

#[test]
fn earlier_day_cannot_be_turned_into_rest() {
    let (engine, activity) = engine();
    activity.workout_on(&[d(2024, 3, 11), d(2024, 3, 13)]);
    engine.evaluate(d(2024, 3, 11), false).unwrap();
    engine.evaluate(d(2024, 3, 13), false).unwrap();
    assert_eq!(status_of(&engine, d(2024, 3, 12)), Some(DayStatus::Frozen));
    let before = engine.streak_state();

    assert!(engine.mark_rest_day(d(2024, 3, 12)).is_err());

    // The token already spent on the 12th stays spent
    assert_eq!(status_of(&engine, d(2024, 3, 12)), Some(DayStatus::Frozen));
    assert_eq!(engine.streak_state(), before);
}

#[test]
fn earlier_rest_day_is_still_reported_as_rest() {
    let (engine, _activity) = engine();
    assert!(engine.mark_rest_day(d(2024, 3, 11)).unwrap());
    engine.evaluate(d(2024, 3, 14), false).unwrap();
    let before = engine.streak_state();

    assert_eq!(
        engine.mark_rest_day_detailed(d(2024, 3, 11)).unwrap(),
        RestDayDecision::AlreadyRest
    );
    assert_eq!(engine.streak_state(), before);
}
