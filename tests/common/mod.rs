// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use quizpress::{config::Config, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port over a private in-memory database.
pub async fn spawn_app() -> TestApp {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        pool,
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a user and returns `(user_id, token)`.
    pub async fn register_and_login(&self, username: &str) -> (i64, String) {
        let email = format!("{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
        let password = "password123";

        let registered: Value = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "confirm_password": password
            }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .unwrap();

        let login: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .unwrap();

        (
            registered["id"].as_i64().expect("id in register response"),
            login["token"].as_str().expect("Token not found").to_string(),
        )
    }

    pub async fn create_post(&self, token: &str, title: &str) -> i64 {
        let resp: Value = self
            .client
            .post(self.url("/api/posts"))
            .bearer_auth(token)
            .json(&json!({"title": title, "content": "<p>Some reading first.</p>"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        resp["id"].as_i64().expect("post id")
    }

    pub async fn create_test(&self, token: &str, post_id: i64, title: &str) -> i64 {
        let resp = self
            .client
            .post(self.url(&format!("/api/posts/{}/test/new", post_id)))
            .bearer_auth(token)
            .json(&json!({"title": title, "questions": sample_questions()}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        let body: Value = resp.json().await.unwrap();
        body["id"].as_i64().expect("test id")
    }

    pub async fn result_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM passed_tests")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Three questions; the correct answers are 1, 0, 2.
pub fn sample_questions() -> Value {
    json!([
        {"text": "Which layer does IP live on?", "options": ["Link", "Network", "Transport"], "correct_index": 1},
        {"text": "Is TCP connection-oriented?", "options": ["Yes", "No"], "correct_index": 0},
        {"text": "Default HTTPS port?", "options": ["80", "21", "443"], "correct_index": 2}
    ])
}

/// Reads `word/document.xml` out of a `.docx` package.
pub fn document_xml(bytes: &[u8]) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("docx is a zip");
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document part")
        .read_to_string(&mut xml)
        .unwrap();
    xml
}
