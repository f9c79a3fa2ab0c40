// src/quiz/evaluator.rs

use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::{
    error::AppError,
    models::{
        passed_test::ScoreResult,
        publication::{Publication, Question},
    },
    quiz::store,
    utils::dates,
};

/// Outcome of comparing answers against a question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    /// 0..=100. Exactly 100 only when every answer is right, exactly 0 only
    /// when none is.
    pub percent_correct: i64,
}

/// Scores `answers` (question index → option index) against `questions`.
///
/// Missing answers earn nothing; answers for indices past the end are ignored.
pub fn evaluate(
    questions: &[Question],
    answers: &HashMap<usize, usize>,
) -> Result<Evaluation, AppError> {
    let total = questions.len();
    if total == 0 {
        return Err(AppError::InvalidState(
            "Cannot score a test without questions".to_string(),
        ));
    }

    let correct = questions
        .iter()
        .enumerate()
        .filter(|(index, q)| answers.get(index) == Some(&q.correct_index))
        .count();

    Ok(Evaluation {
        correct,
        total,
        percent_correct: percent(correct, total),
    })
}

/// Nearest-integer percentage, halves rounding up, kept off the 0 and 100
/// endpoints unless the result is all wrong or all right.
fn percent(correct: usize, total: usize) -> i64 {
    let rounded = ((correct * 200 + total) / (total * 2)) as i64;
    if correct == total {
        100
    } else if correct == 0 {
        0
    } else {
        rounded.clamp(1, 99)
    }
}

/// Scores a submission for the test attached to `post_id`.
///
/// Nothing is stored; the caller decides whether to record the result.
pub async fn evaluate_submission(
    conn: &mut SqliteConnection,
    viewer_id: i64,
    post_id: i64,
    answers: &HashMap<usize, usize>,
) -> Result<(Publication, ScoreResult), AppError> {
    let post = store::find_post(conn, post_id).await?;
    if post.user_id == viewer_id {
        return Err(AppError::Forbidden(
            "Authors cannot take their own test".to_string(),
        ));
    }

    let test = store::get_test_for_post(conn, post_id)
        .await?
        .ok_or(AppError::NotFound("This post has no test".to_string()))?;

    let evaluation = evaluate(&test.questions, answers)?;
    let completed_at = dates::now_seconds();

    tracing::debug!(
        post_id,
        test_id = test.id,
        correct = evaluation.correct,
        total = evaluation.total,
        "Submission scored"
    );

    let result = ScoreResult {
        post_id,
        test_id: test.id,
        correct: evaluation.correct,
        total: evaluation.total,
        percent_correct: evaluation.percent_correct,
        completed_at,
        completed_at_display: dates::format_display(&completed_at),
    };

    Ok((test, result))
}
