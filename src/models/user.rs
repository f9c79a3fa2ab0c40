// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Display name. Not unique at registration.
    pub username: String,

    /// Unique login email.
    pub email: String,

    /// File name under `static/profile_pics`.
    pub image_file: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Role flag: 0 for regular users.
    pub role: i64,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn image_url(&self) -> String {
        format!("/static/profile_pics/{}", self.image_file)
    }
}

/// Account view returned to the owner.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub role: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        let image_url = user.image_url();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image_url,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 60,
        message = "Username length must be between 2 and 60 characters."
    ))]
    pub username: String,
    #[validate(email(message = "Поле заполнено неверно"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Поле заполнено неверно"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Поле заполнено неверно"))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for updating the current account.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(
        min = 8,
        max = 60,
        message = "Username length must be between 8 and 60 characters."
    ))]
    pub username: String,
    #[validate(email(message = "Поле заполнено неверно"))]
    pub email: String,
}
