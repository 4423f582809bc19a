//! Business-day arithmetic. Weekends are skipped; market holidays are not
//! modelled.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// True for Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first weekday strictly after `date`, or `None` past the end of the
/// representable calendar
pub fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let skip = match date.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    date.checked_add_days(Days::new(skip))
}

/// The next `n` business days after `date`, in order. Shorter than `n` only
/// when the calendar runs out.
pub fn business_days_after(date: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut current = date;
    for _ in 0..n {
        match next_business_day(current) {
            Some(next) => current = next,
            None => break,
        }
        days.push(current);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_friday_rolls_to_monday() {
        // 2024-03-08 is a Friday
        assert_eq!(next_business_day(date(2024, 3, 8)), Some(date(2024, 3, 11)));
    }

    #[test]
    fn test_weekend_rolls_to_monday() {
        assert_eq!(next_business_day(date(2024, 3, 9)), Some(date(2024, 3, 11)));
        assert_eq!(next_business_day(date(2024, 3, 10)), Some(date(2024, 3, 11)));
    }

    #[test]
    fn test_business_days_after_skips_weekend() {
        // Thursday 2024-03-07
        let days = business_days_after(date(2024, 3, 7), 3);
        assert_eq!(days, vec![date(2024, 3, 8), date(2024, 3, 11), date(2024, 3, 12)]);
        assert!(days.iter().all(|d| is_business_day(*d)));
    }

    #[test]
    fn test_end_of_calendar_has_no_next_day() {
        assert_eq!(next_business_day(NaiveDate::MAX), None);
        assert!(business_days_after(NaiveDate::MAX, 3).is_empty());
    }

    #[test]
    fn test_zero_days() {
        assert!(business_days_after(date(2024, 3, 7), 0).is_empty());
    }
}
