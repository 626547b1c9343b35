use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use timetable_backend::config::AppConfig;
use timetable_backend::db::{self, repository};
use timetable_backend::error::AppError;
use timetable_backend::models::{Actor, Parity, Role};
use timetable_backend::services::{CreateSeriesRequest, create_series};

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

fn admin() -> Actor {
    Actor {
        id: "admin-1".to_string(),
        role: Role::Admin,
    }
}

// Autumn 2024: Mon 2024-09-02 .. Sun 2024-12-29.
fn autumn_config() -> AppConfig {
    AppConfig {
        semester_start: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
        semester_end: NaiveDate::from_ymd_opt(2024, 12, 29).unwrap(),
        academic_year_start_month: 9,
    }
}

fn request(group_id: i64, weekday: u32, parity: Parity) -> CreateSeriesRequest {
    CreateSeriesRequest {
        group_id,
        weekday,
        parity,
        start_time: "08:30".to_string(),
        end_time: "10:00".to_string(),
        subject: "Algebra".to_string(),
        teacher_id: None,
        room: "201".to_string(),
        kind: "lecture".to_string(),
    }
}

#[tokio::test]
async fn creates_one_lesson_per_matching_date() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let created = create_series(&pool, &autumn_config(), &admin(), request(group.id, 0, Parity::Any))
        .await
        .expect("series creation failed");
    // Mondays from 2024-09-02 through 2024-12-23.
    assert_eq!(created.created, 17);
    assert_eq!(created.first_date, "2024-09-02");
    assert_eq!(created.last_date, "2024-12-23");

    let lessons = repository::fetch_lessons_in_range(&pool, group.id, "2024-09-01", "2024-12-31")
        .await
        .unwrap();
    assert_eq!(lessons.len(), 17);
    assert!(lessons.iter().all(|l| l.subject == "Algebra"));

    let audits = repository::fetch_audit(&pool, 100).await.unwrap();
    assert!(audits.iter().any(|r| r.action == "create_series"));
}

#[tokio::test]
async fn parity_restricted_series_split_the_any_series() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();
    let config = autumn_config();

    let even = create_series(&pool, &config, &admin(), request(group.id, 2, Parity::Even))
        .await
        .unwrap();
    let odd = create_series(&pool, &config, &admin(), request(group.id, 2, Parity::Odd))
        .await
        .unwrap();

    let all = repository::fetch_lessons_in_range(&pool, group.id, "2024-09-01", "2024-12-31")
        .await
        .unwrap();
    assert_eq!(all.len(), even.created + odd.created);
    // Every Wednesday in the window appears exactly once across both runs.
    let mut dates: Vec<&str> = all.iter().map(|l| l.date.as_str()).collect();
    dates.dedup();
    assert_eq!(dates.len(), all.len());
}

#[tokio::test]
async fn an_empty_generated_set_is_a_validation_error() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    // Tue .. Thu window contains no Monday.
    let config = AppConfig {
        semester_start: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
        semester_end: NaiveDate::from_ymd_opt(2024, 9, 5).unwrap(),
        academic_year_start_month: 9,
    };

    let err = create_series(&pool, &config, &admin(), request(group.id, 0, Parity::Any))
        .await
        .expect_err("empty date set must fail");
    assert!(matches!(err, AppError::Validation(_)));

    let lessons = repository::fetch_lessons_in_range(&pool, group.id, "2024-01-01", "2024-12-31")
        .await
        .unwrap();
    assert!(lessons.is_empty());
}

#[tokio::test]
async fn sunday_and_invalid_weekdays_are_rejected() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    for weekday in [6, 7, 42] {
        let err = create_series(&pool, &autumn_config(), &admin(), request(group.id, weekday, Parity::Any))
            .await
            .expect_err("invalid weekday must fail");
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn series_creation_requires_admin_and_a_known_group() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let teacher = Actor {
        id: "teacher-1".to_string(),
        role: Role::Teacher,
    };
    assert!(matches!(
        create_series(&pool, &autumn_config(), &teacher, request(group.id, 0, Parity::Any)).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        create_series(&pool, &autumn_config(), &admin(), request(999, 0, Parity::Any)).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn unknown_teacher_id_creates_no_lessons() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let mut dangling = request(group.id, 0, Parity::Any);
    dangling.teacher_id = Some(999);
    let err = create_series(&pool, &autumn_config(), &admin(), dangling)
        .await
        .expect_err("unknown teacher must fail");
    match err {
        AppError::Validation(msg) => assert!(msg.contains("teacher")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let lessons = repository::fetch_lessons_in_range(&pool, group.id, "2024-01-01", "2024-12-31")
        .await
        .unwrap();
    assert!(lessons.is_empty());

    let teacher = repository::insert_teacher(&pool, "Ivanov").await.unwrap();
    let mut valid = request(group.id, 0, Parity::Any);
    valid.teacher_id = Some(teacher.id);
    let created = create_series(&pool, &autumn_config(), &admin(), valid)
        .await
        .expect("valid teacher reference must succeed");
    assert_eq!(created.created, 17);
}

#[tokio::test]
async fn malformed_lesson_fields_are_rejected_before_any_insert() {
    let pool = setup_db().await;
    let group = repository::insert_group(&pool, "CS-101").await.unwrap();

    let mut bad = request(group.id, 0, Parity::Any);
    bad.kind = "seminar".to_string();
    assert!(matches!(
        create_series(&pool, &autumn_config(), &admin(), bad).await,
        Err(AppError::Validation(_))
    ));

    let mut inverted = request(group.id, 0, Parity::Any);
    inverted.start_time = "11:00".to_string();
    inverted.end_time = "09:00".to_string();
    assert!(matches!(
        create_series(&pool, &autumn_config(), &admin(), inverted).await,
        Err(AppError::Validation(_))
    ));
}
