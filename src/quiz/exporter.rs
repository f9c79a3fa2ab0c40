// src/quiz/exporter.rs

use std::io::Cursor;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use docx_rs::{Docx, Paragraph, Run, RunFonts};
use sqlx::{FromRow, SqliteConnection};

use crate::{error::AppError, utils::dates};

pub const FONT_FAMILY: &str = "Arial";

/// Body text size in points.
pub const FONT_SIZE_PT: usize = 14;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A stored result with everything needed to print it.
#[derive(Debug, Clone, FromRow)]
pub struct ResultDocument {
    pub result_id: i64,
    pub user_id: i64,
    pub test_title: String,
    pub username: String,
    pub score: i64,
    pub completed_at: DateTime<Utc>,
}

impl ResultDocument {
    /// The four document lines, in print order.
    pub fn lines(&self) -> [String; 4] {
        [
            format!("Название тестирования: {}", self.test_title),
            format!("Прошел тестирование: {}", self.username),
            format!("Процент правильных ответов: {}%", self.score),
            format!(
                "Дата прохождения тестирования: {}",
                dates::format_display(&self.completed_at)
            ),
        ]
    }

    /// Builds the `.docx` package in memory.
    pub fn render(&self) -> Result<Vec<u8>, AppError> {
        let fonts = RunFonts::new()
            .ascii(FONT_FAMILY)
            .hi_ansi(FONT_FAMILY)
            .east_asia(FONT_FAMILY)
            .cs(FONT_FAMILY);

        // docx sizes are in half-points
        let mut docx = Docx::new()
            .default_fonts(fonts)
            .default_size(FONT_SIZE_PT * 2);

        for line in self.lines() {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }

        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).map_err(|e| {
            AppError::InternalServerError(format!("Failed to build result document: {}", e))
        })?;

        Ok(buf.into_inner())
    }

    /// Renders the document as a download named after `exported_at`.
    pub fn export(&self, exported_at: DateTime<Utc>) -> Result<ExportedDocument, AppError> {
        Ok(ExportedDocument {
            filename: export_filename(&exported_at),
            bytes: self.render()?,
        })
    }
}

/// `test_result_<YYYYMMDD_HHMMSS>.docx`.
pub fn export_filename(exported_at: &DateTime<Utc>) -> String {
    format!(
        "test_result_{}.docx",
        exported_at.format(dates::FILENAME_FORMAT)
    )
}

/// Loads a result with its test and user by id.
pub async fn load_result_document(
    conn: &mut SqliteConnection,
    result_id: i64,
) -> Result<ResultDocument, AppError> {
    sqlx::query_as::<_, ResultDocument>(
        r#"
        SELECT
            r.id AS result_id,
            r.user_id,
            t.title AS test_title,
            u.username,
            r.score,
            r.completed_at
        FROM passed_tests r
        JOIN publications t ON r.test_id = t.id
        JOIN users u ON r.user_id = u.id
        WHERE r.id = ?
        "#,
    )
    .bind(result_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound("Result not found".to_string()))
}

/// A rendered document ready to be sent as an attachment.
#[derive(Debug)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl IntoResponse for ExportedDocument {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", self.filename),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}
