use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Actor, LessonInput, LessonTemplate, Parity};
use crate::services::day_replace::validate_lesson_input;
use crate::services::{audit, require_admin};

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub affected: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplateRequest {
    /// Monday=0 .. Saturday=5.
    pub day_of_week: i64,
    pub parity: Parity,
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
    #[serde(default)]
    pub teacher_name: String,
    pub room: String,
    pub kind: String,
}

/// Adds one recurring template to a group's weekly grid. This is how the
/// legacy schema gets its rows; the bulk operations below only move or
/// remove them.
pub async fn create_template(
    db: &SqlitePool,
    actor: &Actor,
    group_id: i64,
    req: NewTemplateRequest,
) -> Result<LessonTemplate, AppError> {
    require_admin(actor)?;

    if !(0..=5).contains(&req.day_of_week) {
        return Err(AppError::Validation(
            "day_of_week must be 0..5 (Monday..Saturday)".to_string(),
        ));
    }
    let input = LessonInput {
        start_time: req.start_time.clone(),
        end_time: req.end_time.clone(),
        subject: req.subject.clone(),
        teacher_id: None,
        room: req.room.clone(),
        kind: req.kind.clone(),
    };
    validate_lesson_input(&input).map_err(AppError::Validation)?;

    repository::find_group_by_id(db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let template = LessonTemplate {
        id: Uuid::new_v4().to_string(),
        group_id,
        day_of_week: req.day_of_week,
        parity: req.parity.as_i64(),
        start_time: input.start_time.trim().to_string(),
        end_time: input.end_time.trim().to_string(),
        subject: input.subject.trim().to_string(),
        teacher_name: req.teacher_name.trim().to_string(),
        room: input.room.trim().to_string(),
        kind: input.kind.trim().to_string(),
    };

    let mut conn = db.acquire().await?;
    repository::insert_template(&mut *conn, &template).await?;
    drop(conn);

    info!(
        "created template for group {} (day {}, {} week)",
        group_id,
        template.day_of_week,
        req.parity.label()
    );

    audit::record(
        db,
        &actor.id,
        "create_template",
        "lesson_templates",
        Some(template.id.clone()),
        None,
        Some(json!(template)),
    )
    .await;

    Ok(template)
}

/// Replaces the `to` parity's templates with copies of the `from` parity's.
/// Source rows are read into memory before the target delete, so calling
/// with `from == to` leaves the set unchanged instead of losing it.
pub async fn copy_week(
    db: &SqlitePool,
    actor: &Actor,
    group_id: i64,
    from: Parity,
    to: Parity,
) -> Result<BulkOutcome, AppError> {
    require_admin(actor)?;
    repository::find_group_by_id(db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let source = repository::fetch_templates(db, group_id, from).await?;
    if source.is_empty() {
        return Err(AppError::NotFound);
    }

    let copies: Vec<LessonTemplate> = source
        .iter()
        .map(|t| LessonTemplate {
            id: Uuid::new_v4().to_string(),
            parity: to.as_i64(),
            ..t.clone()
        })
        .collect();

    let mut tx = db.begin().await?;
    let old_target = repository::templates_for_parity(&mut *tx, group_id, to).await?;
    repository::delete_templates(&mut *tx, group_id, to).await?;
    for template in &copies {
        repository::insert_template(&mut *tx, template).await?;
    }
    tx.commit().await?;

    info!(
        "copied {} templates for group {} from {} week to {} week",
        copies.len(),
        group_id,
        from.label(),
        to.label()
    );

    audit::record(
        db,
        &actor.id,
        "copy_week",
        "lesson_templates",
        None,
        Some(json!({ "group_id": group_id, "parity": to, "templates": old_target })),
        Some(json!({ "group_id": group_id, "parity": to, "templates": copies })),
    )
    .await;

    Ok(BulkOutcome { affected: copies.len() })
}

/// Deletes every template for (group, parity) and reports how many went.
pub async fn clear_week(
    db: &SqlitePool,
    actor: &Actor,
    group_id: i64,
    parity: Parity,
) -> Result<BulkOutcome, AppError> {
    require_admin(actor)?;
    repository::find_group_by_id(db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut tx = db.begin().await?;
    let old = repository::templates_for_parity(&mut *tx, group_id, parity).await?;
    let removed = repository::delete_templates(&mut *tx, group_id, parity).await?;
    tx.commit().await?;

    info!(
        "cleared {} templates for group {} ({} week)",
        removed,
        group_id,
        parity.label()
    );

    if removed > 0 {
        audit::record(
            db,
            &actor.id,
            "clear_week",
            "lesson_templates",
            None,
            Some(json!({ "group_id": group_id, "parity": parity, "templates": old })),
            Some(json!({ "group_id": group_id, "parity": parity, "templates": [] })),
        )
        .await;
    }

    Ok(BulkOutcome { affected: removed as usize })
}

/// Rewrites the denormalized teacher name on every template of the group
/// that matches `old_name` exactly (after trimming). No fuzzy matching.
pub async fn replace_teacher(
    db: &SqlitePool,
    actor: &Actor,
    group_id: i64,
    old_name: &str,
    new_name: &str,
) -> Result<BulkOutcome, AppError> {
    require_admin(actor)?;

    let old_name = old_name.trim();
    let new_name = new_name.trim();
    if old_name.is_empty() || new_name.is_empty() {
        return Err(AppError::Validation(
            "teacher names must not be empty".to_string(),
        ));
    }

    repository::find_group_by_id(db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let updated = repository::update_teacher_name(db, group_id, old_name, new_name).await?;

    info!(
        "renamed teacher {:?} to {:?} on {} templates of group {}",
        old_name, new_name, updated, group_id
    );

    if updated > 0 {
        audit::record(
            db,
            &actor.id,
            "replace_teacher",
            "lesson_templates",
            None,
            Some(json!({ "group_id": group_id, "teacher_name": old_name })),
            Some(json!({ "group_id": group_id, "teacher_name": new_name, "updated": updated })),
        )
        .await;
    }

    Ok(BulkOutcome { affected: updated as usize })
}
