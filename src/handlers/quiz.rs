// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        passed_test::{ResultHandlingRequest, SubmitAnswersRequest},
        publication::TestRequest,
    },
    quiz::{
        evaluator, exporter,
        exporter::ExportedDocument,
        recorder, renderer, store,
    },
    utils::{
        dates,
        jwt::Claims,
        notice::redirect_home_with_error,
    },
};

/// Opens the test attached to a post.
///
/// A post without a test yields `available: false` rather than an error.
pub async fn submission_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let form = renderer::render_submission_form(&mut *conn, claims.user_id()?, post_id).await?;
    Ok(Json(form))
}

/// Attaches a test to a post. Author only.
pub async fn create_test(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Result<Json<TestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let user_id = claims.user_id()?;
    let mut tx = pool.begin().await?;
    let test = store::create_test(&mut *tx, user_id, post_id, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(test)))
}

/// Replaces a post's test. Author only.
pub async fn update_test(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Result<Json<TestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let user_id = claims.user_id()?;
    let mut tx = pool.begin().await?;
    let test = store::update_test(&mut *tx, user_id, post_id, &payload).await?;
    tx.commit().await?;

    Ok(Json(test))
}

/// Scores submitted answers and returns a confirmation. Stores nothing.
pub async fn score_submission(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Result<Json<SubmitAnswersRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let mut conn = pool.acquire().await?;
    let (_, result) =
        evaluator::evaluate_submission(&mut *conn, claims.user_id()?, post_id, &payload.answers)
            .await?;
    Ok(Json(result))
}

/// Scores the answers again, records the attempt and returns the `.docx`.
///
/// Any failure ends in a redirect to the home feed with a notice.
pub async fn handle_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    payload: Result<Json<ResultHandlingRequest>, JsonRejection>,
) -> Response {
    let outcome = match payload {
        Ok(Json(payload)) => record_submission(&pool, &claims, post_id, payload).await,
        Err(rejection) => Err(AppError::from(rejection)),
    };
    finish(outcome)
}

async fn record_submission(
    pool: &SqlitePool,
    claims: &Claims,
    post_id: i64,
    payload: ResultHandlingRequest,
) -> Result<ExportedDocument, AppError> {
    let user_id = claims.user_id()?;
    let confirmed_at = payload
        .completed_at
        .as_deref()
        .map(dates::parse_display)
        .transpose()?;

    let mut conn = pool.acquire().await?;
    let (test, score) =
        evaluator::evaluate_submission(&mut *conn, user_id, post_id, &payload.answers).await?;
    drop(conn);

    let completed_at = match confirmed_at {
        Some(at) => {
            dates::ensure_recent(at, score.completed_at)?;
            at
        }
        None => score.completed_at,
    };

    record_and_export(pool, user_id, test.id, score.percent_correct, completed_at).await
}

/// Path parameters of the old result-handling route.
#[derive(Debug, Deserialize)]
pub struct LegacyResultPath {
    #[serde(rename = "id")]
    pub post_id: i64,
    pub score: i64,
    pub user_id: i64,
    pub test_id: i64,
    pub completed_at: String,
}

/// Deprecated: records a score supplied in the URL.
///
/// Kept for old clients. The caller must be the user named in the path and
/// the test must belong to the post.
pub async fn handle_result_legacy(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<LegacyResultPath>, PathRejection>,
) -> Response {
    let outcome = match path {
        Ok(Path(path)) => record_legacy(&pool, &claims, path).await,
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    };
    finish(outcome)
}

async fn record_legacy(
    pool: &SqlitePool,
    claims: &Claims,
    path: LegacyResultPath,
) -> Result<ExportedDocument, AppError> {
    let completed_at = dates::parse_display(&path.completed_at)?;

    if claims.user_id()? != path.user_id {
        return Err(AppError::Forbidden(
            "Results can only be recorded for yourself".to_string(),
        ));
    }

    let mut conn = pool.acquire().await?;
    let post = store::find_post(&mut *conn, path.post_id).await?;
    if post.user_id == path.user_id {
        return Err(AppError::Forbidden(
            "Authors cannot take their own test".to_string(),
        ));
    }
    let test = store::get_test_for_post(&mut *conn, path.post_id)
        .await?
        .filter(|t| t.id == path.test_id)
        .ok_or(AppError::NotFound("Test not found for this post".to_string()))?;
    drop(conn);

    tracing::warn!(
        post_id = path.post_id,
        user_id = path.user_id,
        "Deprecated result-handling route used"
    );

    record_and_export(pool, path.user_id, test.id, path.score, completed_at).await
}

/// Re-exports a stored result owned by the caller.
pub async fn export_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(result_id): Path<i64>,
) -> Result<ExportedDocument, AppError> {
    let mut conn = pool.acquire().await?;
    let document = exporter::load_result_document(&mut *conn, result_id).await?;
    if document.user_id != claims.user_id()? {
        return Err(AppError::Forbidden("This result belongs to another user".to_string()));
    }
    document.export(Utc::now())
}

/// Commits the attempt, then renders it by its new id.
///
/// The record is committed on its own; a failed export leaves it in place
/// and it can be fetched again from `/api/results/{id}/document`.
async fn record_and_export(
    pool: &SqlitePool,
    user_id: i64,
    test_id: i64,
    score: i64,
    completed_at: DateTime<Utc>,
) -> Result<ExportedDocument, AppError> {
    let mut tx = pool.begin().await?;
    let result_id = recorder::record_result(&mut *tx, user_id, test_id, score, completed_at).await?;
    tx.commit().await?;

    let mut conn = pool.acquire().await?;
    let document = exporter::load_result_document(&mut *conn, result_id).await?;
    document.export(Utc::now())
}

fn finish(outcome: Result<ExportedDocument, AppError>) -> Response {
    match outcome {
        Ok(document) => {
            tracing::info!(filename = %document.filename, "Result exported");
            document.into_response()
        }
        Err(e) => {
            tracing::warn!("Result handling failed: {}", e);
            redirect_home_with_error(&format!(
                "Тестирование не сохранено! Ошибка: {}",
                e.public_message()
            ))
            .into_response()
        }
    }
}
