use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{error::AppError, models::publication::PublicTest, quiz::store};

/// What the viewer sees when opening a post's test.
#[derive(Debug, Serialize)]
pub struct SubmissionForm {
    pub post_id: i64,
    pub post_title: String,
    /// Authors can look at their own test but cannot submit it.
    pub is_author: bool,
    /// `false` when the post has no test yet.
    pub available: bool,
    pub test: Option<PublicTest>,
}

pub async fn render_submission_form(
    conn: &mut SqliteConnection,
    viewer_id: i64,
    post_id: i64,
) -> Result<SubmissionForm, AppError> {
    let post = store::find_post(conn, post_id).await?;
    let test = store::get_test_for_post(conn, post_id).await?;

    Ok(SubmissionForm {
        post_id: post.id,
        post_title: post.title,
        is_author: post.user_id == viewer_id,
        available: test.is_some(),
        test: test.as_ref().map(PublicTest::from),
    })
}
