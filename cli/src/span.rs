//! Elapsed-day arithmetic between calendar dates.

use chrono::{NaiveDate, Utc};

/// Whole days from `from` to `to`. Negative when `from` is in the future.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole days from `date` until today.
pub fn days_since(date: NaiveDate) -> i64 {
    days_between(date, Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_between() {
        let from = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2012, 2, 1).unwrap();
        assert_eq!(days_between(from, to), 31);
        assert_eq!(days_between(to, from), -31);
        assert_eq!(days_between(from, from), 0);
    }

    #[test]
    fn test_days_since_is_nonnegative_for_past_dates() {
        let past = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        assert!(days_since(past) > 0);
    }
}
