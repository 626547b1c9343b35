use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use timetable_backend::auth::{self, LoginRequest};
use timetable_backend::db::{self, repository};
use timetable_backend::error::AppError;
use timetable_backend::models::{Lesson, LessonTemplate, Parity, Role};
use timetable_backend::schedule::compute_week;

async fn setup_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create test db");
    db::init_schema(&pool).await.expect("Failed to init schema");
    pool
}

#[tokio::test]
async fn login_mints_a_token_that_resolves_to_the_actor() {
    let pool = setup_db().await;
    let user_id = auth::create_user(&pool, "dekan", "s3cret", Role::Admin)
        .await
        .expect("create_user failed");

    let response = auth::login(
        &pool,
        LoginRequest {
            username: "dekan".to_string(),
            password: "s3cret".to_string(),
        },
    )
    .await
    .expect("login failed");
    assert_eq!(response.role, Role::Admin);

    let actor = repository::find_actor_by_token(&pool, &response.token)
        .await
        .unwrap()
        .expect("token must resolve");
    assert_eq!(actor.id, user_id);
    assert_eq!(actor.role, Role::Admin);
}

#[tokio::test]
async fn bad_credentials_and_unknown_tokens_are_unauthorized() {
    let pool = setup_db().await;
    auth::create_user(&pool, "dekan", "s3cret", Role::Admin)
        .await
        .unwrap();

    let err = auth::login(
        &pool,
        LoginRequest {
            username: "dekan".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await
    .expect_err("wrong password must fail");
    assert!(matches!(err, AppError::Unauthorized));

    let err = auth::login(
        &pool,
        LoginRequest {
            username: "nobody".to_string(),
            password: "s3cret".to_string(),
        },
    )
    .await
    .expect_err("unknown user must fail");
    assert!(matches!(err, AppError::Unauthorized));

    let missing = repository::find_actor_by_token(&pool, "not-a-token")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_usernames_and_group_names_conflict() {
    let pool = setup_db().await;
    auth::create_user(&pool, "dekan", "s3cret", Role::Admin)
        .await
        .unwrap();
    let err = auth::create_user(&pool, "dekan", "other", Role::Student)
        .await
        .expect_err("duplicate username must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    repository::insert_group(&pool, "CS-101").await.unwrap();
    let err = repository::insert_group(&pool, "CS-101")
        .await
        .expect_err("duplicate group name must fail");
    let is_unique = matches!(
        &err,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation()
    );
    assert!(is_unique, "expected a unique violation, got {:?}", err);
}

#[tokio::test]
async fn ensure_admin_user_is_idempotent() {
    let pool = setup_db().await;
    auth::ensure_admin_user(&pool, "admin", "admin").await.unwrap();
    auth::ensure_admin_user(&pool, "admin", "admin").await.unwrap();

    let user = repository::find_user_by_username(&pool, "admin")
        .await
        .unwrap()
        .expect("bootstrap admin must exist");
    assert_eq!(user.2, Role::Admin);
}

#[tokio::test]
async fn deleting_a_group_cascades_to_lessons_and_templates() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    repository::insert_lesson(
        &mut *conn,
        &Lesson {
            id: Uuid::new_v4().to_string(),
            group_id: group.id,
            date: "2024-09-12".to_string(),
            start_time: "08:30".to_string(),
            end_time: "10:00".to_string(),
            subject: "Algebra".to_string(),
            teacher_id: None,
            room: "201".to_string(),
            kind: "lecture".to_string(),
        },
    )
    .await
    .unwrap();
    repository::insert_template(
        &mut *conn,
        &LessonTemplate {
            id: Uuid::new_v4().to_string(),
            group_id: group.id,
            day_of_week: 0,
            parity: Parity::Any.as_i64(),
            start_time: "08:30".to_string(),
            end_time: "10:00".to_string(),
            subject: "Algebra".to_string(),
            teacher_name: "Ivanov".to_string(),
            room: "201".to_string(),
            kind: "lecture".to_string(),
        },
    )
    .await
    .unwrap();
    drop(conn);

    assert!(repository::delete_group(&pool, group.id).await.unwrap());

    let lessons = repository::fetch_lessons_in_range(&pool, group.id, "2024-01-01", "2024-12-31")
        .await
        .unwrap();
    assert!(lessons.is_empty());
    let templates = repository::fetch_templates(&pool, group.id, Parity::Any)
        .await
        .unwrap();
    assert!(templates.is_empty());
}

#[tokio::test]
async fn the_week_view_picks_up_exactly_that_weeks_lessons() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    for (date, subject) in [
        ("2024-09-09", "Inside Monday"),
        ("2024-09-15", "Inside Sunday"),
        ("2024-09-08", "Week before"),
        ("2024-09-16", "Week after"),
    ] {
        repository::insert_lesson(
            &mut *conn,
            &Lesson {
                id: Uuid::new_v4().to_string(),
                group_id: group.id,
                date: date.to_string(),
                start_time: "08:30".to_string(),
                end_time: "10:00".to_string(),
                subject: subject.to_string(),
                teacher_id: None,
                room: "201".to_string(),
                kind: "lecture".to_string(),
            },
        )
        .await
        .unwrap();
    }
    drop(conn);

    let now = NaiveDate::from_ymd_opt(2024, 9, 11)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let week = compute_week(now, 0, 9);
    assert_eq!(week.week_start, NaiveDate::from_ymd_opt(2024, 9, 9).unwrap());

    let lessons = repository::fetch_lessons_in_range(
        &pool,
        group.id,
        &week.week_start.format("%Y-%m-%d").to_string(),
        &week.week_end.format("%Y-%m-%d").to_string(),
    )
    .await
    .unwrap();

    let subjects: Vec<&str> = lessons.iter().map(|l| l.subject.as_str()).collect();
    assert_eq!(subjects, ["Inside Monday", "Inside Sunday"]);
}
