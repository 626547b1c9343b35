use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Actor, Lesson, LessonInput, Parity};
use crate::schedule::generate_dates;
use crate::services::{audit, require_admin};
use crate::services::day_replace::validate_lesson_input;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSeriesRequest {
    pub group_id: i64,
    /// Monday=0 .. Saturday=5.
    pub weekday: u32,
    pub parity: Parity,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    pub room: String,
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedSeries {
    pub created: usize,
    pub first_date: String,
    pub last_date: String,
}

/// Materializes a recurring lesson as concrete dated rows: one lesson per
/// date the semester window yields for (weekday, parity). A combination
/// yielding no dates is a validation error, never a silent no-op.
pub async fn create_series(
    db: &SqlitePool,
    config: &AppConfig,
    actor: &Actor,
    req: CreateSeriesRequest,
) -> Result<CreatedSeries, AppError> {
    require_admin(actor)?;

    if req.weekday > 5 {
        return Err(AppError::Validation(
            "weekday must be 0..5 (Monday..Saturday)".to_string(),
        ));
    }

    let input = LessonInput {
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        subject: req.subject.clone(),
        teacher_id: req.teacher_id,
        room: req.room.clone(),
        kind: req.kind.clone(),
    };
    validate_lesson_input(&input).map_err(AppError::Validation)?;

    repository::find_group_by_id(db, req.group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let dates = generate_dates(
        req.weekday,
        req.parity,
        config.semester_start,
        config.semester_end,
    );
    if dates.is_empty() {
        return Err(AppError::Validation(
            "no semester dates match the requested weekday and parity".to_string(),
        ));
    }

    let lessons: Vec<Lesson> = dates
        .iter()
        .map(|date| Lesson {
            id: Uuid::new_v4().to_string(),
            group_id: req.group_id,
            date: date.format("%Y-%m-%d").to_string(),
            start_time: input.start_time.trim().to_string(),
            end_time: input.end_time.trim().to_string(),
            subject: input.subject.trim().to_string(),
            teacher_id: input.teacher_id,
            room: input.room.trim().to_string(),
            kind: input.kind.trim().to_string(),
        })
        .collect();

    let mut tx = db.begin().await?;
    if let Some(teacher_id) = req.teacher_id {
        if !repository::teacher_exists(&mut *tx, teacher_id).await? {
            return Err(AppError::Validation(format!("unknown teacher id {}", teacher_id)));
        }
    }
    for lesson in &lessons {
        repository::insert_lesson(&mut *tx, lesson).await?;
    }
    tx.commit().await?;

    let first_date = lessons[0].date.clone();
    let last_date = lessons[lessons.len() - 1].date.clone();

    info!(
        "created series of {} lessons for group {} ({} .. {})",
        lessons.len(),
        req.group_id,
        first_date,
        last_date
    );

    audit::record(
        db,
        &actor.id,
        "create_series",
        "lessons",
        None,
        None,
        Some(json!({
            "group_id": req.group_id,
            "weekday": req.weekday,
            "parity": req.parity,
            "created": lessons.len(),
            "first_date": first_date,
            "last_date": last_date,
        })),
    )
    .await;

    Ok(CreatedSeries {
        created: lessons.len(),
        first_date,
        last_date,
    })
}
