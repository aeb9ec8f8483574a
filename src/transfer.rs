//! CSV export and import of questions.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::admin::form::{validate_draft, Draft, ValidationError};
use crate::api::{Category, Question};

// csv can't write a Vec field under a header row, so options get a column each
#[derive(Serialize, Deserialize)]
struct QuestionRecord {
    #[serde(default)]
    id: Option<String>,
    category: Category,
    question: String,
    option_1: String,
    option_2: String,
    option_3: String,
    option_4: String,
    correct_answer: String,
}

impl From<&Question> for QuestionRecord {
    fn from(question: &Question) -> Self {
        let option = |i: usize| question.options.get(i).cloned().unwrap_or_default();
        Self {
            id: question.id.clone(),
            category: question.category,
            question: question.question.clone(),
            option_1: option(0),
            option_2: option(1),
            option_3: option(2),
            option_4: option(3),
            correct_answer: question.correct_answer.clone(),
        }
    }
}

impl From<QuestionRecord> for Draft {
    fn from(record: QuestionRecord) -> Self {
        Self {
            category: record.category,
            question: record.question,
            options: [
                record.option_1,
                record.option_2,
                record.option_3,
                record.option_4,
            ],
            correct_answer: record.correct_answer,
        }
    }
}

/// Why a CSV row was skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// One CSV row that could not be turned into a question.
#[derive(Debug)]
pub struct RejectedRow {
    /// 1-based data row number, header excluded.
    pub row: usize,
    pub reason: RowError,
}

pub fn write_questions(path: &Path, questions: &[Question]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    for question in questions {
        wtr.serialize(QuestionRecord::from(question))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads questions ready to be created. Ids in the file are ignored since the
/// API assigns new ones. Rows that fail to parse or validate are returned
/// separately and do not stop the rest of the file.
pub fn read_questions(path: &Path) -> anyhow::Result<(Vec<Question>, Vec<RejectedRow>)> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (n, record) in rdr.deserialize::<QuestionRecord>().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                return Err(e).with_context(|| format!("Cannot read {}", path.display()))
            }
            Err(e) => {
                rejected.push(RejectedRow {
                    row: n + 1,
                    reason: RowError::Malformed(e.to_string()),
                });
                continue;
            }
        };
        match validate_draft(&Draft::from(record)) {
            Ok(question) => accepted.push(question),
            Err(e) => rejected.push(RejectedRow {
                row: n + 1,
                reason: e.into(),
            }),
        }
    }
    Ok((accepted, rejected))
}
