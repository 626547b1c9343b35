use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::models::WeekInfo;

/// Computes the academic week containing `now` shifted by `week_offset`
/// whole weeks. Pure; call once per schedule read with the injected clock.
///
/// The academic year starts on the 1st of `start_month` (September by
/// default): if `now` falls before that month, the start belongs to the
/// previous calendar year. Week numbers count Monday-start weeks from the
/// week containing that date, 1-based: both the target date and the
/// academic start are aligned to their Mondays first, so the week whose
/// Monday falls up to six days before the start date is still week 1 and
/// numbering advances by exactly one per week.
pub fn compute_week(now: NaiveDateTime, week_offset: i64, start_month: u32) -> WeekInfo {
    let start_month = start_month.clamp(1, 12);
    let today = now.date();

    let academic_year = if today.month() >= start_month {
        today.year()
    } else {
        today.year() - 1
    };
    let academic_start = NaiveDate::from_ymd_opt(academic_year, start_month, 1)
        .expect("first day of a clamped month");
    let academic_week_start =
        academic_start - Duration::days(academic_start.weekday().num_days_from_monday() as i64);

    let target = today + Duration::days(week_offset * 7);
    let week_start = target - Duration::days(target.weekday().num_days_from_monday() as i64);
    let week_end = week_start + Duration::days(6);

    let week_number = (week_start - academic_week_start).num_days() / 7 + 1;

    WeekInfo {
        week_number,
        is_even: week_number % 2 == 0,
        week_start,
        week_end,
    }
}
