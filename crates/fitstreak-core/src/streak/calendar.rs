//! Calendar helpers shared by the engine and the admission controller.
//!
//! All arithmetic is on [`NaiveDate`]; callers pick the calendar (the CLI
//! uses the local time zone) before handing dates to the core.

use chrono::{Datelike, Days, NaiveDate};

/// Monday-start week containing `date`, as an inclusive `(monday, sunday)` pair.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let monday = date - Days::new(offset);
    (monday, monday + Days::new(6))
}

/// Year-month key in `YYYY-MM` form, used for token replenishment.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

pub fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.succ_opt()
}

/// Inclusive iterator over `start..=end`. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take_while(move |d| *d <= end)
}

/// Number of whole days strictly between `earlier` and `later`.
pub fn days_strictly_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    ((later - earlier).num_days() - 1).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-13 is a Wednesday
        assert_eq!(week_bounds(d(2024, 3, 13)), (d(2024, 3, 11), d(2024, 3, 17)));
        // Monday and Sunday map onto their own week
        assert_eq!(week_bounds(d(2024, 3, 11)).0, d(2024, 3, 11));
        assert_eq!(week_bounds(d(2024, 3, 17)).0, d(2024, 3, 11));
    }

    #[test]
    fn week_may_span_months() {
        // 2024-03-01 is a Friday
        assert_eq!(week_bounds(d(2024, 3, 1)), (d(2024, 2, 26), d(2024, 3, 3)));
    }

    #[test]
    fn month_key_is_zero_padded() {
        assert_eq!(month_key(d(2024, 3, 9)), "2024-03");
        assert_eq!(month_key(d(2023, 12, 31)), "2023-12");
    }

    #[test]
    fn inclusive_iteration() {
        let days: Vec<_> = days_inclusive(d(2024, 2, 28), d(2024, 3, 1)).collect();
        assert_eq!(days, vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
        assert_eq!(days_inclusive(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
    }

    #[test]
    fn strictly_between() {
        assert_eq!(days_strictly_between(d(2024, 3, 1), d(2024, 3, 2)), 0);
        assert_eq!(days_strictly_between(d(2024, 3, 1), d(2024, 3, 4)), 2);
        assert_eq!(days_strictly_between(d(2024, 3, 4), d(2024, 3, 1)), 0);
    }
}
