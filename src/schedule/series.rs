use chrono::{Datelike, NaiveDate};

use crate::models::Parity;

/// Enumerates every date in the inclusive `[start, end]` window whose
/// weekday (Monday=0 .. Saturday=5, Sundays never match) equals `weekday`
/// and whose ISO-8601 week parity satisfies `parity`. Ascending, finite,
/// deterministic for fixed bounds.
///
/// An empty result is legal output here; callers creating lessons from it
/// must reject it instead of silently writing nothing.
pub fn generate_dates(weekday: u32, parity: Parity, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if weekday > 5 {
        return dates;
    }
    let mut day = start;
    while day <= end {
        if day.weekday().num_days_from_monday() == weekday {
            let week_is_even = day.iso_week().week() % 2 == 0;
            if parity.matches(week_is_even) {
                dates.push(day);
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // Autumn 2024 window used by most tests: Mon 2024-09-02 .. Sun 2024-12-29.
    fn window() -> (NaiveDate, NaiveDate) {
        (d(2024, 9, 2), d(2024, 12, 29))
    }

    #[test]
    fn any_is_the_disjoint_union_of_even_and_odd() {
        let (start, end) = window();
        for weekday in 0..6 {
            let any = generate_dates(weekday, Parity::Any, start, end);
            let even = generate_dates(weekday, Parity::Even, start, end);
            let odd = generate_dates(weekday, Parity::Odd, start, end);

            assert_eq!(any.len(), even.len() + odd.len());
            let mut merged: Vec<_> = even.iter().chain(odd.iter()).copied().collect();
            merged.sort();
            assert_eq!(merged, any);
            assert!(even.iter().all(|day| !odd.contains(day)));
        }
    }

    #[test]
    fn dates_are_ascending_and_match_the_requested_weekday() {
        let (start, end) = window();
        let mondays = generate_dates(0, Parity::Any, start, end);
        assert!(!mondays.is_empty());
        assert!(mondays.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(mondays.iter().all(|day| day.weekday().num_days_from_monday() == 0));
        assert!(mondays.iter().all(|day| *day >= start && *day <= end));
        // 2024-09-02 through 2024-12-23 inclusive.
        assert_eq!(mondays.len(), 17);
    }

    #[test]
    fn parity_follows_the_iso_week_number() {
        let (start, end) = window();
        for day in generate_dates(2, Parity::Even, start, end) {
            assert_eq!(day.iso_week().week() % 2, 0);
        }
        for day in generate_dates(2, Parity::Odd, start, end) {
            assert_eq!(day.iso_week().week() % 2, 1);
        }
    }

    #[test]
    fn sundays_and_out_of_range_weekdays_yield_nothing() {
        let (start, end) = window();
        assert!(generate_dates(6, Parity::Any, start, end).is_empty());
        assert!(generate_dates(42, Parity::Any, start, end).is_empty());
    }

    #[test]
    fn window_without_the_weekday_is_empty() {
        // Tue 2024-09-03 .. Thu 2024-09-05 contains no Monday.
        assert!(generate_dates(0, Parity::Any, d(2024, 9, 3), d(2024, 9, 5)).is_empty());
    }

    #[test]
    fn single_day_window_matches_itself() {
        let wednesday = d(2024, 9, 4);
        assert_eq!(
            generate_dates(2, Parity::Any, wednesday, wednesday),
            vec![wednesday]
        );
    }
}
