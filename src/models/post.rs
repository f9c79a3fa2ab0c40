use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Post row joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostListItem {
    pub id: i64,
    pub user_id: i64,
    pub author_username: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Short reference to the test attached to a post.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestSummary {
    pub id: i64,
    pub title: String,
}

/// A single post with its optional test.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostListItem,
    pub test: Option<TestSummary>,
}

/// DTO for creating or editing a post.
#[derive(Debug, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(
        min = 5,
        max = 40,
        message = "Title length must be between 5 and 40 chars"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Number of items to return (default: 6, max: 50).
    pub limit: Option<i64>,
}

impl PostListParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(6).clamp(1, 50)
    }
}

/// Query parameters for the home feed, including a one-shot notice.
#[derive(Debug, Deserialize)]
pub struct HomeParams {
    pub limit: Option<i64>,
    pub notice: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Notice {
    pub message: String,
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub notice: Option<Notice>,
    pub posts: Vec<PostListItem>,
}
