// src/quiz/recorder.rs

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{error::AppError, models::passed_test::PassedTestEntry};

/// Appends one attempt and returns its id.
///
/// Rows are never updated; repeating a test adds another row.
pub async fn record_result(
    conn: &mut SqliteConnection,
    user_id: i64,
    test_id: i64,
    score: i64,
    completed_at: DateTime<Utc>,
) -> Result<i64, AppError> {
    if !(0..=100).contains(&score) {
        return Err(AppError::BadRequest(format!(
            "Score must be between 0 and 100, got {}",
            score
        )));
    }

    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM publications WHERE id = ?")
        .bind(test_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    let result_id = sqlx::query(
        r#"
        INSERT INTO passed_tests (user_id, test_id, score, completed_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(test_id)
    .bind(score)
    .bind(completed_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record result: {:?}", e);
        AppError::from(e)
    })?
    .last_insert_rowid();

    tracing::info!(result_id, user_id, test_id, score, "Result recorded");

    Ok(result_id)
}

/// The user's attempts, newest first.
pub async fn list_results_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<PassedTestEntry>, AppError> {
    let entries = sqlx::query_as::<_, PassedTestEntry>(
        r#"
        SELECT
            r.id,
            r.test_id,
            t.title AS test_title,
            r.score,
            r.completed_at
        FROM passed_tests r
        JOIN publications t ON r.test_id = t.id
        WHERE r.user_id = ?
        ORDER BY r.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(entries)
}
