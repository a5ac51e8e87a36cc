//! Singleton streak counters and their persisted envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Version tag written into the persisted envelope.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Live streak counters.
///
/// Created lazily on the first evaluation and mutated only by the
/// [`StreakEngine`](super::StreakEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub last_workout_date: Option<NaiveDate>,
    /// Day a freeze token was last spent on.
    pub last_streak_protected_date: Option<NaiveDate>,
    pub freeze_tokens_remaining: u32,
    pub rest_days_used_this_week: u32,
    /// `YYYY-MM` key of the last replenishment.
    pub last_token_reset_month: Option<String>,
    /// Reconciliation has run through this date.
    pub last_evaluated_date: Option<NaiveDate>,
}

impl StreakState {
    /// State used when nothing has been persisted yet.
    pub fn fresh(monthly_allotment: u32) -> Self {
        Self {
            current_streak_days: 0,
            longest_streak_days: 0,
            last_workout_date: None,
            last_streak_protected_date: None,
            freeze_tokens_remaining: monthly_allotment,
            rest_days_used_this_week: 0,
            last_token_reset_month: None,
            last_evaluated_date: None,
        }
    }

    /// Raise the longest-streak watermark if the current streak exceeds it.
    pub fn raise_watermark(&mut self) {
        self.longest_streak_days = self.longest_streak_days.max(self.current_streak_days);
    }

    /// Encode into the versioned JSON envelope stored in the kv table.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope {
            version: STATE_FORMAT_VERSION,
            state: self.clone(),
        })
    }

    /// Decode a persisted envelope.
    ///
    /// Returns `None` for malformed JSON or an unknown version so the engine
    /// falls back to a first-run bootstrap.
    pub fn decode(raw: &str) -> Option<Self> {
        let envelope: Envelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "streak state is unreadable, starting over");
                return None;
            }
        };
        if envelope.version != STATE_FORMAT_VERSION {
            tracing::warn!(
                version = envelope.version,
                "unsupported streak state version, starting over"
            );
            return None;
        }
        Some(envelope.state)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    #[serde(flatten)]
    state: StreakState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_full_allotment() {
        let state = StreakState::fresh(2);
        assert_eq!(state.freeze_tokens_remaining, 2);
        assert_eq!(state.current_streak_days, 0);
        assert!(state.last_evaluated_date.is_none());
    }

    #[test]
    fn envelope_carries_version() {
        let raw = StreakState::fresh(2).encode().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["freeze_tokens_remaining"], 2);
    }

    #[test]
    fn decode_restores_dates() {
        let mut state = StreakState::fresh(1);
        state.current_streak_days = 4;
        state.last_workout_date = NaiveDate::from_ymd_opt(2024, 5, 2);
        state.last_token_reset_month = Some("2024-05".into());
        let decoded = StreakState::decode(&state.encode().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn corrupt_or_unknown_version_is_none() {
        assert!(StreakState::decode("{not json").is_none());
        assert!(StreakState::decode(r#"{"version": 99}"#).is_none());
        assert!(StreakState::decode(r#"{"version": 1, "current_streak_days": -3}"#).is_none());
    }

    #[test]
    fn watermark_never_drops() {
        let mut state = StreakState::fresh(2);
        state.current_streak_days = 5;
        state.raise_watermark();
        state.current_streak_days = 1;
        state.raise_watermark();
        assert_eq!(state.longest_streak_days, 5);
    }
}
