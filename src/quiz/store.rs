// src/quiz/store.rs

use sqlx::{SqliteConnection, types::Json};
use validator::Validate;

use crate::{
    error::{AppError, conflict_or_internal},
    models::{
        post::Post,
        publication::{Publication, TestRequest},
    },
};

/// Loads a post or fails with `NotFound`.
pub async fn find_post(conn: &mut SqliteConnection, post_id: i64) -> Result<Post, AppError> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, content, created_at
        FROM posts
        WHERE id = ?
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound("Post not found".to_string()))
}

/// Only the author of a post may change it or its test.
pub fn ensure_owner(post: &Post, user_id: i64) -> Result<(), AppError> {
    if post.user_id != user_id {
        return Err(AppError::Forbidden(
            "You are not the author of this post".to_string(),
        ));
    }
    Ok(())
}

/// The test attached to a post, if any.
pub async fn get_test_for_post(
    conn: &mut SqliteConnection,
    post_id: i64,
) -> Result<Option<Publication>, AppError> {
    let test = sqlx::query_as::<_, Publication>(
        r#"
        SELECT id, post_id, title, questions
        FROM publications
        WHERE post_id = ?
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(test)
}

/// Attaches a new test to a post owned by `user_id`.
pub async fn create_test(
    conn: &mut SqliteConnection,
    user_id: i64,
    post_id: i64,
    req: &TestRequest,
) -> Result<Publication, AppError> {
    let post = find_post(conn, post_id).await?;
    ensure_owner(&post, user_id)?;

    req.validate()?;

    let test_id = sqlx::query(
        r#"
        INSERT INTO publications (post_id, title, questions)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(post_id)
    .bind(&req.title)
    .bind(Json(&req.questions))
    .execute(&mut *conn)
    .await
    .map_err(|e| conflict_or_internal(e, "This post already has a test"))?
    .last_insert_rowid();

    tracing::info!(test_id, post_id, user_id, "Test created");

    Ok(Publication {
        id: test_id,
        post_id,
        title: req.title.clone(),
        questions: Json(req.questions.clone()),
    })
}

/// Replaces the title and questions of a post's test.
pub async fn update_test(
    conn: &mut SqliteConnection,
    user_id: i64,
    post_id: i64,
    req: &TestRequest,
) -> Result<Publication, AppError> {
    let post = find_post(conn, post_id).await?;
    ensure_owner(&post, user_id)?;

    req.validate()?;

    let existing = get_test_for_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("This post has no test".to_string()))?;

    sqlx::query("UPDATE publications SET title = ?, questions = ? WHERE id = ?")
        .bind(&req.title)
        .bind(Json(&req.questions))
        .bind(existing.id)
        .execute(&mut *conn)
        .await?;

    tracing::info!(test_id = existing.id, post_id, user_id, "Test updated");

    Ok(Publication {
        id: existing.id,
        post_id,
        title: req.title.clone(),
        questions: Json(req.questions.clone()),
    })
}
