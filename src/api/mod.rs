use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{self, LoginRequest, LoginResponse};
use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::schedule::compute_week;
use crate::services::{self, audit};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/schedule", get(get_schedule))
        .route("/schedule/day", put(replace_day))
        .route("/lessons/series", post(create_series))
        .route("/lessons/{id}", delete(delete_lesson))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", delete(delete_group))
        .route("/groups/{id}/template", get(list_templates).post(create_template))
        .route("/teachers", get(list_teachers).post(create_teacher))
        .route("/teachers/{id}", delete(delete_teacher))
        .route("/template/copy-week", post(copy_week))
        .route("/template/clear-week", post(clear_week))
        .route("/template/replace-teacher", post(replace_teacher))
        .route("/audit", get(list_audit))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth::login(&state.db, req).await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
struct ScheduleQuery {
    group_id: i64,
    #[serde(default)]
    week_offset: i64,
}

#[derive(Serialize)]
struct ScheduleResponse {
    week: WeekInfo,
    lessons: Vec<Lesson>,
}

async fn get_schedule(
    State(state): State<AppState>,
    _actor: Actor,
    Query(params): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, AppError> {
    repository::find_group_by_id(&state.db, params.group_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let week = compute_week(
        state.clock.now(),
        params.week_offset,
        state.config.academic_year_start_month,
    );
    let lessons = repository::fetch_lessons_in_range(
        &state.db,
        params.group_id,
        &week.week_start.format("%Y-%m-%d").to_string(),
        &week.week_end.format("%Y-%m-%d").to_string(),
    )
    .await?;

    Ok(Json(ScheduleResponse { week, lessons }))
}

async fn replace_day(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<services::ReplaceDayRequest>,
) -> Result<Json<services::ReplacedDay>, AppError> {
    let replaced = services::replace_day(&state.db, state.clock.as_ref(), &actor, req).await?;
    Ok(Json(replaced))
}

async fn create_series(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<services::CreateSeriesRequest>,
) -> Result<Json<services::CreatedSeries>, AppError> {
    let created = services::create_series(&state.db, &state.config, &actor, req).await?;
    Ok(Json(created))
}

async fn delete_lesson(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services::require_admin(&actor)?;

    let old = repository::find_lesson_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    repository::delete_lesson(&state.db, &id).await?;

    audit::record(
        &state.db,
        &actor.id,
        "delete_lesson",
        "lesson",
        Some(id),
        Some(json!(old)),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_groups(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<Vec<Group>>, AppError> {
    let groups = repository::fetch_groups(&state.db).await?;
    Ok(Json(groups))
}

async fn create_group(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewGroupRequest>,
) -> Result<Json<Group>, AppError> {
    services::require_admin(&actor)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("group name must not be empty".to_string()));
    }

    let group = repository::insert_group(&state.db, name)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("group {:?} already exists", name))
            }
            other => AppError::Database(other),
        })?;

    audit::record(
        &state.db,
        &actor.id,
        "create_group",
        "group",
        Some(group.id.to_string()),
        None,
        Some(json!(group)),
    )
    .await;

    Ok(Json(group))
}

async fn delete_group(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::require_admin(&actor)?;

    let old = repository::find_group_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    repository::delete_group(&state.db, id).await?;

    audit::record(
        &state.db,
        &actor.id,
        "delete_group",
        "group",
        Some(id.to_string()),
        Some(json!(old)),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct TemplateQuery {
    parity: Parity,
}

async fn list_templates(
    State(state): State<AppState>,
    _actor: Actor,
    Path(group_id): Path<i64>,
    Query(params): Query<TemplateQuery>,
) -> Result<Json<Vec<LessonTemplate>>, AppError> {
    repository::find_group_by_id(&state.db, group_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let templates = repository::fetch_templates(&state.db, group_id, params.parity).await?;
    Ok(Json(templates))
}

async fn create_template(
    State(state): State<AppState>,
    actor: Actor,
    Path(group_id): Path<i64>,
    Json(req): Json<services::NewTemplateRequest>,
) -> Result<Json<LessonTemplate>, AppError> {
    let template = services::create_template(&state.db, &actor, group_id, req).await?;
    Ok(Json(template))
}

async fn list_teachers(
    State(state): State<AppState>,
    _actor: Actor,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = repository::fetch_teachers(&state.db).await?;
    Ok(Json(teachers))
}

async fn create_teacher(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<NewTeacherRequest>,
) -> Result<Json<Teacher>, AppError> {
    services::require_admin(&actor)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("teacher name must not be empty".to_string()));
    }

    let teacher = repository::insert_teacher(&state.db, name).await?;

    audit::record(
        &state.db,
        &actor.id,
        "create_teacher",
        "teacher",
        Some(teacher.id.to_string()),
        None,
        Some(json!(teacher)),
    )
    .await;

    Ok(Json(teacher))
}

async fn delete_teacher(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::require_admin(&actor)?;

    let removed = repository::delete_teacher(&state.db, id).await?;
    if !removed {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.db,
        &actor.id,
        "delete_teacher",
        "teacher",
        Some(id.to_string()),
        None,
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct CopyWeekRequest {
    group_id: i64,
    from: Parity,
    to: Parity,
}

async fn copy_week(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CopyWeekRequest>,
) -> Result<Json<services::BulkOutcome>, AppError> {
    let outcome =
        services::copy_week(&state.db, &actor, req.group_id, req.from, req.to).await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct ClearWeekRequest {
    group_id: i64,
    parity: Parity,
}

async fn clear_week(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ClearWeekRequest>,
) -> Result<Json<services::BulkOutcome>, AppError> {
    let outcome = services::clear_week(&state.db, &actor, req.group_id, req.parity).await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct ReplaceTeacherRequest {
    group_id: i64,
    old_name: String,
    new_name: String,
}

async fn replace_teacher(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<ReplaceTeacherRequest>,
) -> Result<Json<services::BulkOutcome>, AppError> {
    let outcome = services::replace_teacher(
        &state.db,
        &actor,
        req.group_id,
        &req.old_name,
        &req.new_name,
    )
    .await?;
    Ok(Json(outcome))
}

#[derive(Deserialize)]
struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

async fn list_audit(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditRecord>>, AppError> {
    services::require_admin(&actor)?;
    let records = repository::fetch_audit(&state.db, params.limit.clamp(1, 1000)).await?;
    Ok(Json(records))
}
