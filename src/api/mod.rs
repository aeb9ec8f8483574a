//! Remote quiz API: wire models, errors and the HTTP client.

pub mod client;
mod deserializers;

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub use client::{QuestionApi, QuestionClient};

pub const DEFAULT_API_URL: &str = "https://quiz-project-dpaw.onrender.com/api/admin";

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Food,
    Water,
    Minerals,
    Forest,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Water,
        Category::Minerals,
        Category::Forest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Water => "Water",
            Category::Minerals => "Minerals",
            Category::Forest => "Forest",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| format!("Unknown category {value}"))
    }
}

/// A quiz question as exchanged with the API.
///
/// `id` is assigned by the API and is absent on questions that were never
/// saved. Some deployments send it as a number, so it is accepted as either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserializers::deserialize_optional_id"
    )]
    pub id: Option<String>,
    pub category: Category,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request to the quiz API failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API rejected the session token.
    #[error("the quiz API rejected the session token")]
    Unauthorized,
    #[error("the quiz API answered with {0}")]
    Status(StatusCode),
    #[error("request was cancelled")]
    Cancelled,
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_uses_camel_case_and_omits_missing_id() {
        let question = Question {
            id: None,
            category: Category::Water,
            question: "Is water wet?".to_owned(),
            options: vec!["Yes".into(), "No".into(), "Maybe".into(), "Unknown".into()],
            correct_answer: "Yes".to_owned(),
        };
        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "category": "Water",
                "question": "Is water wet?",
                "options": ["Yes", "No", "Maybe", "Unknown"],
                "correctAnswer": "Yes",
            })
        );
    }

    #[test]
    fn question_accepts_numeric_and_string_ids() {
        let numeric: Question = serde_json::from_value(serde_json::json!({
            "id": 42,
            "category": "Forest",
            "question": "q",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "a",
        }))
        .unwrap();
        assert_eq!(numeric.id.as_deref(), Some("42"));

        let text: Question = serde_json::from_value(serde_json::json!({
            "id": "65f0c1",
            "category": "Minerals",
            "question": "q",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "a",
        }))
        .unwrap();
        assert_eq!(text.id.as_deref(), Some("65f0c1"));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("Lava".parse::<Category>().is_err());
        assert_eq!("Minerals".parse::<Category>(), Ok(Category::Minerals));
    }
}
