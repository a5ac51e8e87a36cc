//! Freeze-token economy.
//!
//! Tokens replenish to the monthly allotment on a month change and never
//! stack. At most one token is spent per calendar date, and only while a
//! streak is running.

use chrono::NaiveDate;

use super::calendar::month_key;
use super::state::StreakState;

/// Result of asking the economy to cover a missed day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// No running streak, nothing to protect.
    NothingToProtect,
    /// The date was already protected by an earlier evaluation.
    AlreadyProtected,
    /// A token was spent on the date.
    Spent,
    /// No tokens left; the streak breaks.
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
pub struct FreezeTokens {
    monthly_allotment: u32,
}

impl FreezeTokens {
    pub fn new(monthly_allotment: u32) -> Self {
        Self { monthly_allotment }
    }

    pub fn monthly_allotment(&self) -> u32 {
        self.monthly_allotment
    }

    /// Refill to the allotment when `today` is in a new month.
    ///
    /// Returns `true` when a refill happened.
    pub fn replenish(&self, state: &mut StreakState, today: NaiveDate) -> bool {
        let month = month_key(today);
        if state.last_token_reset_month.as_deref() == Some(month.as_str()) {
            // Keep the bound even if the allotment was lowered mid-month.
            state.freeze_tokens_remaining = state.freeze_tokens_remaining.min(self.monthly_allotment);
            return false;
        }
        state.freeze_tokens_remaining = self.monthly_allotment;
        state.last_token_reset_month = Some(month);
        true
    }

    /// Try to cover `date` with a token.
    ///
    /// The protected-date guard is checked before anything is spent.
    pub fn protect(&self, state: &mut StreakState, date: NaiveDate) -> Protection {
        if state.current_streak_days == 0 {
            return Protection::NothingToProtect;
        }
        if state.last_streak_protected_date == Some(date) {
            return Protection::AlreadyProtected;
        }
        if state.freeze_tokens_remaining == 0 {
            return Protection::Exhausted;
        }
        state.freeze_tokens_remaining -= 1;
        state.last_streak_protected_date = Some(date);
        Protection::Spent
    }

    /// Record protection for a day that is already FROZEN on disk, without
    /// spending. Returns `false` when it was already recorded.
    pub fn acknowledge(&self, state: &mut StreakState, date: NaiveDate) -> bool {
        if state.last_streak_protected_date == Some(date) {
            return false;
        }
        state.last_streak_protected_date = Some(date);
        true
    }
}
