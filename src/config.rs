use chrono::NaiveDate;
use tracing::warn;

/// Calendar constants the schedule logic depends on. Loaded once at
/// startup; tests build their own values directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// First day of the semester window for series generation.
    pub semester_start: NaiveDate,
    /// Last day of the semester window, inclusive.
    pub semester_end: NaiveDate,
    /// 1-based month the academic year starts in (September).
    pub academic_year_start_month: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let semester_start = date_env("SEMESTER_START", "2026-09-01");
        let semester_end = date_env("SEMESTER_END", "2026-12-31");
        let academic_year_start_month = std::env::var("ACADEMIC_YEAR_START_MONTH")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .unwrap_or(9);

        if semester_end < semester_start {
            warn!(
                "SEMESTER_END {} precedes SEMESTER_START {}; series generation will produce no dates",
                semester_end, semester_start
            );
        }

        Self {
            semester_start,
            semester_end,
            academic_year_start_month,
        }
    }
}

fn date_env(key: &str, default: &str) -> NaiveDate {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            warn!("{} = {:?} is not a YYYY-MM-DD date ({}); using {}", key, raw, e, default);
            NaiveDate::parse_from_str(default, "%Y-%m-%d").expect("default date literal")
        }
    }
}
