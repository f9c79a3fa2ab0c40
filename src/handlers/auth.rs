// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, conflict_or_internal},
    models::user::{AccountResponse, LoginRequest, RegisterRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the account (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;

    let id = sqlx::query(
        r#"
        INSERT INTO users (username, email, password, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        conflict_or_internal(e, "Этот email занят. Пожалуйста, выберите другой.")
    })?
    .last_insert_rowid();

    let user = find_user(&pool, id).await?;
    tracing::info!(user_id = id, "User registered");

    Ok((StatusCode::CREATED, Json(AccountResponse::from(user))))
}

/// Authenticates a user by email and returns a JWT token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let failed = || {
        AppError::AuthError(
            "Вход неуспешный. Пожалуйста, проверьте электронную почту и пароль".to_string(),
        )
    };

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, image_file, password, role, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&payload.email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?
    .ok_or_else(failed)?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(failed());
    }

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

pub(crate) async fn find_user(pool: &SqlitePool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, image_file, password, role, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))
}
