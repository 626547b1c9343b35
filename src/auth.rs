use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Actor, Role};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Verifies the credentials and mints an opaque bearer token.
pub async fn login(db: &SqlitePool, req: LoginRequest) -> Result<LoginResponse, AppError> {
    let (user_id, password_hash, role) = repository::find_user_by_username(db, &req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if hash_password(&req.password) != password_hash {
        return Err(AppError::Unauthorized);
    }

    let token = Uuid::new_v4().to_string();
    repository::insert_token(db, &token, &user_id, &Utc::now().to_rfc3339()).await?;

    Ok(LoginResponse { token, role })
}

pub async fn create_user(
    db: &SqlitePool,
    username: &str,
    password: &str,
    role: Role,
) -> Result<String, AppError> {
    let id = Uuid::new_v4().to_string();
    repository::insert_user(db, &id, username, &hash_password(password), role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("username {:?} already exists", username))
            }
            other => AppError::Database(other),
        })?;
    Ok(id)
}

/// Makes sure an admin account exists on startup so a fresh database is
/// usable. Credentials come from ADMIN_USERNAME / ADMIN_PASSWORD.
pub async fn ensure_admin_user(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    if repository::find_user_by_username(db, username).await?.is_some() {
        return Ok(());
    }
    create_user(db, username, password, Role::Admin).await?;
    info!("created bootstrap admin user {:?}", username);
    Ok(())
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        repository::find_actor_by_token(&state.db, token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
