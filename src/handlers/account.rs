use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, conflict_or_internal},
    handlers::auth::find_user,
    models::user::{AccountResponse, UpdateAccountRequest},
    quiz::recorder,
    utils::jwt::Claims,
};

/// Current user's account.
pub async fn get_account(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = find_user(&pool, claims.user_id()?).await?;
    Ok(Json(AccountResponse::from(user)))
}

/// Updates the display name and email.
/// Both must stay unique across other accounts.
pub async fn update_account(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let user_id = claims.user_id()?;

    let name_taken = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM users WHERE username = ? AND id != ? LIMIT 1",
    )
    .bind(&payload.username)
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    if name_taken.is_some() {
        return Err(AppError::Conflict(
            "Это имя занято. Пожалуйста, выберите другой.".to_string(),
        ));
    }

    sqlx::query("UPDATE users SET username = ?, email = ? WHERE id = ?")
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(user_id)
        .execute(&pool)
        .await
        .map_err(|e| conflict_or_internal(e, "Это письмо занято. Пожалуйста, выберите другой."))?;

    tracing::info!(user_id, "Account updated");

    let user = find_user(&pool, user_id).await?;
    Ok(Json(AccountResponse::from(user)))
}

/// Recorded attempts of the current user.
pub async fn list_my_results(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let entries = recorder::list_results_for_user(&mut *conn, claims.user_id()?).await?;
    Ok(Json(entries))
}
