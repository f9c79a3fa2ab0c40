// src/models/publication.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::{Validate, ValidationError};

/// One multiple-choice question of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question prompt.
    pub text: String,

    /// Answer options in display order.
    pub options: Vec<String>,

    /// Index into `options` of the correct answer.
    pub correct_index: usize,
}

/// Represents the 'publications' table: the test attached to a post.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Publication {
    pub id: i64,
    pub post_id: i64,
    pub title: String,

    /// Stored as a JSON array in the database.
    pub questions: Json<Vec<Question>>,
}

/// Question as shown to someone taking the test (no answer key).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub index: usize,
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicTest {
    pub id: i64,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Publication> for PublicTest {
    fn from(test: &Publication) -> Self {
        Self {
            id: test.id,
            title: test.title.clone(),
            questions: test
                .questions
                .iter()
                .enumerate()
                .map(|(index, q)| PublicQuestion {
                    index,
                    text: q.text.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

/// DTO for creating or replacing a test.
#[derive(Debug, Deserialize, Validate)]
pub struct TestRequest {
    #[validate(length(
        min = 5,
        max = 50,
        message = "Test title length must be between 5 and 50 chars"
    ))]
    pub title: String,

    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
}

/// Rejects question lists that could not be rendered or scored.
pub fn validate_questions(questions: &[Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::new("questions_cannot_be_empty"));
    }
    for q in questions {
        if q.text.trim().is_empty() {
            return Err(ValidationError::new("question_text_cannot_be_empty"));
        }
        if q.options.len() < 2 {
            return Err(ValidationError::new("question_needs_two_options"));
        }
        if q.options.iter().any(|opt| opt.trim().is_empty()) {
            return Err(ValidationError::new("option_cannot_be_empty"));
        }
        if q.correct_index >= q.options.len() {
            return Err(ValidationError::new("correct_index_out_of_range"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct_index: usize) -> Question {
        Question {
            text: "What does TCP stand for?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
        }
    }

    #[test]
    fn accepts_well_formed_questions() {
        let qs = vec![question(&["A", "B"], 1), question(&["A", "B", "C"], 0)];
        assert!(validate_questions(&qs).is_ok());
    }

    #[test]
    fn rejects_empty_list() {
        let err = validate_questions(&[]).unwrap_err();
        assert_eq!(err.code, "questions_cannot_be_empty");
    }

    #[test]
    fn rejects_out_of_range_answer() {
        let err = validate_questions(&[question(&["A", "B"], 2)]).unwrap_err();
        assert_eq!(err.code, "correct_index_out_of_range");
    }

    #[test]
    fn rejects_single_option() {
        let err = validate_questions(&[question(&["A"], 0)]).unwrap_err();
        assert_eq!(err.code, "question_needs_two_options");
    }

    #[test]
    fn public_view_hides_answer_key() {
        let test = Publication {
            id: 7,
            post_id: 3,
            title: "Networking Basics".to_string(),
            questions: Json(vec![question(&["Yes", "No"], 1)]),
        };
        let public = PublicTest::from(&test);
        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["questions"][0]["index"], 0);
        assert!(json["questions"][0].get("correct_index").is_none());
    }
}
