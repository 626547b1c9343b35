use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{
    Actor, AuditRecord, Group, Lesson, LessonTemplate, Parity, Role, Teacher,
};

// ---------------------------------------------------------------------------
// groups

pub async fn fetch_groups(db: &SqlitePool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>("SELECT id, name FROM groups ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn find_group_by_id(db: &SqlitePool, id: i64) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>("SELECT id, name FROM groups WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_group(db: &SqlitePool, name: &str) -> Result<Group, sqlx::Error> {
    let result = sqlx::query("INSERT INTO groups (name) VALUES (?)")
        .bind(name)
        .execute(db)
        .await?;

    Ok(Group {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub async fn delete_group(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// teachers

pub async fn fetch_teachers(db: &SqlitePool) -> Result<Vec<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>("SELECT id, name FROM teachers ORDER BY name")
        .fetch_all(db)
        .await
}

pub async fn insert_teacher(db: &SqlitePool, name: &str) -> Result<Teacher, sqlx::Error> {
    let result = sqlx::query("INSERT INTO teachers (name) VALUES (?)")
        .bind(name)
        .execute(db)
        .await?;

    Ok(Teacher {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Runs on the caller's connection so lesson writes can verify the
/// reference inside their own transaction.
pub async fn teacher_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM teachers WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

pub async fn delete_teacher(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teachers WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// lessons (concrete dates)

pub async fn fetch_lessons_in_range(
    db: &SqlitePool,
    group_id: i64,
    start: &str,
    end: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, group_id, date, start_time, end_time, subject, teacher_id, room, kind
        FROM lessons
        WHERE group_id = ? AND date >= ? AND date <= ?
        ORDER BY date, start_time
        "#,
    )
    .bind(group_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

/// Day reads participate in the replace transaction, so they run on the
/// transaction's connection rather than the pool.
pub async fn lessons_for_day(
    conn: &mut SqliteConnection,
    group_id: i64,
    date: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, group_id, date, start_time, end_time, subject, teacher_id, room, kind
        FROM lessons
        WHERE group_id = ? AND date = ?
        ORDER BY start_time
        "#,
    )
    .bind(group_id)
    .bind(date)
    .fetch_all(conn)
    .await
}

pub async fn delete_lessons_for_day(
    conn: &mut SqliteConnection,
    group_id: i64,
    date: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE group_id = ? AND date = ?")
        .bind(group_id)
        .bind(date)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_lesson(conn: &mut SqliteConnection, lesson: &Lesson) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lessons
            (id, group_id, date, start_time, end_time, subject, teacher_id, room, kind)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&lesson.id)
    .bind(lesson.group_id)
    .bind(&lesson.date)
    .bind(&lesson.start_time)
    .bind(&lesson.end_time)
    .bind(&lesson.subject)
    .bind(lesson.teacher_id)
    .bind(&lesson.room)
    .bind(&lesson.kind)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_lesson_by_id(db: &SqlitePool, id: &str) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, group_id, date, start_time, end_time, subject, teacher_id, room, kind
        FROM lessons
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn delete_lesson(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_lessons_for_day(
    db: &SqlitePool,
    group_id: i64,
    date: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM lessons WHERE group_id = ? AND date = ?",
    )
    .bind(group_id)
    .bind(date)
    .fetch_one(db)
    .await
}

// ---------------------------------------------------------------------------
// legacy weekly templates

pub async fn fetch_templates(
    db: &SqlitePool,
    group_id: i64,
    parity: Parity,
) -> Result<Vec<LessonTemplate>, sqlx::Error> {
    sqlx::query_as::<_, LessonTemplate>(
        r#"
        SELECT id, group_id, day_of_week, parity, start_time, end_time,
               subject, teacher_name, room, kind
        FROM lesson_templates
        WHERE group_id = ? AND parity = ?
        ORDER BY day_of_week, start_time
        "#,
    )
    .bind(group_id)
    .bind(parity.as_i64())
    .fetch_all(db)
    .await
}

pub async fn templates_for_parity(
    conn: &mut SqliteConnection,
    group_id: i64,
    parity: Parity,
) -> Result<Vec<LessonTemplate>, sqlx::Error> {
    sqlx::query_as::<_, LessonTemplate>(
        r#"
        SELECT id, group_id, day_of_week, parity, start_time, end_time,
               subject, teacher_name, room, kind
        FROM lesson_templates
        WHERE group_id = ? AND parity = ?
        ORDER BY day_of_week, start_time
        "#,
    )
    .bind(group_id)
    .bind(parity.as_i64())
    .fetch_all(conn)
    .await
}

pub async fn delete_templates(
    conn: &mut SqliteConnection,
    group_id: i64,
    parity: Parity,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lesson_templates WHERE group_id = ? AND parity = ?")
        .bind(group_id)
        .bind(parity.as_i64())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_template(
    conn: &mut SqliteConnection,
    template: &LessonTemplate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lesson_templates
            (id, group_id, day_of_week, parity, start_time, end_time,
             subject, teacher_name, room, kind)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&template.id)
    .bind(template.group_id)
    .bind(template.day_of_week)
    .bind(template.parity)
    .bind(&template.start_time)
    .bind(&template.end_time)
    .bind(&template.subject)
    .bind(&template.teacher_name)
    .bind(&template.room)
    .bind(&template.kind)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_teacher_name(
    db: &SqlitePool,
    group_id: i64,
    old_name: &str,
    new_name: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE lesson_templates SET teacher_name = ? WHERE group_id = ? AND teacher_name = ?",
    )
    .bind(new_name)
    .bind(group_id)
    .bind(old_name)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// audit log (append-only)

pub async fn insert_audit(db: &SqlitePool, record: &AuditRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_log
            (id, admin_id, action, target_type, target_id, old_value, new_value, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.admin_id)
    .bind(&record.action)
    .bind(&record.target_type)
    .bind(&record.target_id)
    .bind(&record.old_value)
    .bind(&record.new_value)
    .bind(&record.created_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn fetch_audit(db: &SqlitePool, limit: i64) -> Result<Vec<AuditRecord>, sqlx::Error> {
    sqlx::query_as::<_, AuditRecord>(
        r#"
        SELECT id, admin_id, action, target_type, target_id, old_value, new_value, created_at
        FROM audit_log
        ORDER BY created_at DESC, id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

// ---------------------------------------------------------------------------
// users & tokens

pub async fn insert_user(
    db: &SqlitePool,
    id: &str,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, username, password_hash, role) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find_user_by_username(
    db: &SqlitePool,
    username: &str,
) -> Result<Option<(String, String, Role)>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id, password_hash, role FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row.and_then(|(id, hash, role)| Role::parse(&role).map(|r| (id, hash, r))))
}

pub async fn insert_token(
    db: &SqlitePool,
    token: &str,
    user_id: &str,
    issued_at: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tokens (token, user_id, issued_at) VALUES (?, ?, ?)")
        .bind(token)
        .bind(user_id)
        .bind(issued_at)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn find_actor_by_token(
    db: &SqlitePool,
    token: &str,
) -> Result<Option<Actor>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT users.id, users.role
        FROM tokens
        JOIN users ON users.id = tokens.user_id
        WHERE tokens.token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(row.and_then(|(id, role)| Role::parse(&role).map(|role| Actor { id, role })))
}
