use chrono::NaiveDate;
use serde::Serialize;

/// Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekInfo {
    /// 1-based count of Monday-start weeks since the academic-year start.
    pub week_number: i64,
    pub is_even: bool,
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week, `week_start + 6`.
    pub week_end: NaiveDate,
}
