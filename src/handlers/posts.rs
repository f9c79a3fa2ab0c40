use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{
        HomeParams, HomeResponse, Notice, PostDetail, PostListItem, PostListParams, PostRequest,
        TestSummary,
    },
    quiz::store,
    utils::{html::clean_html, jwt::Claims},
};

const POST_COLUMNS: &str = r#"
    SELECT
        p.id, p.user_id, u.username AS author_username,
        p.title, p.content, p.created_at
    FROM posts p
    JOIN users u ON p.user_id = u.id
"#;

/// Home feed: newest posts first, plus any notice passed along by a redirect.
pub async fn home(
    State(pool): State<SqlitePool>,
    Query(params): Query<HomeParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = PostListParams { limit: params.limit }.limit();

    let posts = sqlx::query_as::<_, PostListItem>(&format!(
        "{POST_COLUMNS} ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::from(e)
    })?;

    let notice = params.notice.map(|message| Notice {
        message,
        level: params.level.unwrap_or_else(|| "info".to_string()),
    });

    Ok(Json(HomeResponse { notice, posts }))
}

/// Create a new post.
pub async fn create_post(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let user_id = claims.user_id()?;

    let post_id = sqlx::query(
        r#"
        INSERT INTO posts (user_id, title, content, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&payload.title)
    .bind(clean_html(&payload.content))
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::from(e)
    })?
    .last_insert_rowid();

    tracing::info!(post_id, user_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": post_id})),
    ))
}

/// Get a single post with its test, if any.
pub async fn get_post(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = sqlx::query_as::<_, PostListItem>(&format!("{POST_COLUMNS} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let test = sqlx::query_as::<_, TestSummary>(
        "SELECT id, title FROM publications WHERE post_id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?;

    Ok(Json(PostDetail { post, test }))
}

/// Edit a post. Author only.
pub async fn update_post(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let user_id = claims.user_id()?;
    let mut tx = pool.begin().await?;

    let post = store::find_post(&mut *tx, id).await?;
    store::ensure_owner(&post, user_id)?;
    payload.validate()?;

    sqlx::query("UPDATE posts SET title = ?, content = ? WHERE id = ?")
        .bind(&payload.title)
        .bind(clean_html(&payload.content))
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!(post_id = id, user_id, "Post updated");

    Ok(Json(serde_json::json!({"id": id})))
}

/// Delete a post and its test. Author only.
///
/// Refused with 409 once anyone has recorded a result for the post's test.
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let mut tx = pool.begin().await?;

    let post = store::find_post(&mut *tx, id).await?;
    store::ensure_owner(&post, user_id)?;

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let restricted = e
                .as_database_error()
                .map(|db| db.is_foreign_key_violation())
                .unwrap_or(false);
            if restricted {
                AppError::Conflict("This post's test already has recorded results".to_string())
            } else {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::from(e)
            }
        })?;

    tx.commit().await?;
    tracing::info!(post_id = id, user_id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Posts of one user, newest first.
pub async fn list_user_posts(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ? LIMIT 1")
        .bind(&username)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let posts = sqlx::query_as::<_, PostListItem>(&format!(
        "{POST_COLUMNS} WHERE p.user_id = ? ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(params.limit())
    .fetch_all(&pool)
    .await?;

    Ok(Json(posts))
}
