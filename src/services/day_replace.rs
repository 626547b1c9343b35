use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Actor, Lesson, LessonInput};
use crate::services::{audit, require_admin};

#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceDayRequest {
    pub date: String,
    pub group_id: i64,
    pub lessons: Vec<LessonInput>,
}

#[derive(Debug, Serialize)]
pub struct ReplacedDay {
    pub date: String,
    pub group_id: i64,
    pub removed: usize,
    pub inserted: usize,
    pub lessons: Vec<Lesson>,
}

/// Atomically replaces every lesson of one (date, group) day with the
/// given list. Full overwrite: deletes whatever was there, inserts the new
/// entries, commits as one transaction. An empty list clears the day.
/// Idempotent up to lesson IDs, which are minted fresh per call.
pub async fn replace_day(
    db: &SqlitePool,
    clock: &dyn Clock,
    actor: &Actor,
    req: ReplaceDayRequest,
) -> Result<ReplacedDay, AppError> {
    require_admin(actor)?;

    let date = parse_date(&req.date)?;
    let today = clock.now().date();
    if date < today {
        return Err(AppError::Validation("cannot edit past dates".to_string()));
    }
    // Canonical form, so "2024-09-12 " and "2024-09-12" hit the same day key.
    let date_str = date.format("%Y-%m-%d").to_string();

    for (index, input) in req.lessons.iter().enumerate() {
        validate_lesson_input(input)
            .map_err(|msg| AppError::Validation(format!("lesson {}: {}", index + 1, msg)))?;
    }

    repository::find_group_by_id(db, req.group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_lessons: Vec<Lesson> = req
        .lessons
        .iter()
        .map(|input| Lesson {
            id: Uuid::new_v4().to_string(),
            group_id: req.group_id,
            date: date_str.clone(),
            start_time: input.start_time.trim().to_string(),
            end_time: input.end_time.trim().to_string(),
            subject: input.subject.trim().to_string(),
            teacher_id: input.teacher_id,
            room: input.room.trim().to_string(),
            kind: input.kind.trim().to_string(),
        })
        .collect();

    let mut teacher_ids: Vec<i64> = new_lessons.iter().filter_map(|l| l.teacher_id).collect();
    teacher_ids.sort_unstable();
    teacher_ids.dedup();

    let mut tx = db.begin().await?;
    let old_lessons = repository::lessons_for_day(&mut *tx, req.group_id, &date_str).await?;
    let removed = repository::delete_lessons_for_day(&mut *tx, req.group_id, &date_str).await?;
    // Checked on the transaction's own connection; an unknown reference
    // drops the transaction and the deleted rows come back.
    for teacher_id in teacher_ids {
        if !repository::teacher_exists(&mut *tx, teacher_id).await? {
            return Err(AppError::Validation(format!("unknown teacher id {}", teacher_id)));
        }
    }
    for lesson in &new_lessons {
        repository::insert_lesson(&mut *tx, lesson).await?;
    }
    tx.commit().await?;

    info!(
        "replaced day {} for group {}: {} removed, {} inserted",
        date_str,
        req.group_id,
        removed,
        new_lessons.len()
    );

    audit::record(
        db,
        &actor.id,
        "replace_day",
        "schedule_day",
        Some(format!("{}:{}", req.group_id, date_str)),
        Some(json!({ "lessons": old_lessons })),
        Some(json!({ "lessons": new_lessons })),
    )
    .await;

    Ok(ReplacedDay {
        date: date_str,
        group_id: req.group_id,
        removed: removed as usize,
        inserted: new_lessons.len(),
        lessons: new_lessons,
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date {:?}, expected YYYY-MM-DD", raw)))
}

/// Field checks for one lesson entry; any failure rejects the whole request
/// before the transaction starts.
pub(crate) fn validate_lesson_input(input: &LessonInput) -> Result<(), String> {
    let start = parse_time(&input.start_time, "start_time")?;
    let end = parse_time(&input.end_time, "end_time")?;
    if start >= end {
        return Err("start_time must be before end_time".to_string());
    }
    if input.subject.trim().is_empty() {
        return Err("subject must not be empty".to_string());
    }
    if input.room.trim().is_empty() {
        return Err("room must not be empty".to_string());
    }
    match input.kind.trim() {
        "lecture" | "practice" => Ok(()),
        other => Err(format!("kind must be lecture or practice, got {:?}", other)),
    }
}

fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| format!("{} must be HH:MM, got {:?}", field, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(start: &str, end: &str, kind: &str) -> LessonInput {
        LessonInput {
            start_time: start.to_string(),
            end_time: end.to_string(),
            subject: "Algebra".to_string(),
            teacher_id: None,
            room: "201".to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_entry() {
        assert!(validate_lesson_input(&input("08:30", "10:00", "lecture")).is_ok());
        assert!(validate_lesson_input(&input(" 08:30 ", "10:00", "practice")).is_ok());
    }

    #[test]
    fn rejects_inverted_or_equal_times() {
        assert!(validate_lesson_input(&input("10:00", "08:30", "lecture")).is_err());
        assert!(validate_lesson_input(&input("10:00", "10:00", "lecture")).is_err());
    }

    #[test]
    fn rejects_missing_fields_and_bad_kind() {
        assert!(validate_lesson_input(&input("", "10:00", "lecture")).is_err());
        assert!(validate_lesson_input(&input("08:30", "10:00", "seminar")).is_err());

        let mut no_subject = input("08:30", "10:00", "lecture");
        no_subject.subject = "  ".to_string();
        assert!(validate_lesson_input(&no_subject).is_err());

        let mut no_room = input("08:30", "10:00", "lecture");
        no_room.room = String::new();
        assert!(validate_lesson_input(&no_room).is_err());
    }

    #[test]
    fn rejects_non_hhmm_times() {
        assert!(validate_lesson_input(&input("8 am", "10:00", "lecture")).is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-09-02").is_ok());
    }
}
