//! Draft state and validation for the "add question" form.

use crate::api::{Category, Question, OPTION_COUNT};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Question text is required")]
    MissingQuestion,
    #[error("All options must be filled out")]
    MissingOption,
    #[error("Please select the correct answer")]
    MissingCorrectAnswer,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("option slot {0} does not exist")]
pub struct NoSuchOption(pub usize);

/// The question being composed. Never carries an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub category: Category,
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: String,
}

impl Draft {
    /// Non-empty options, in order. These are the only valid answers to pick.
    pub fn answer_choices(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|o| !o.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct QuestionForm {
    draft: Draft,
}

impl QuestionForm {
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_category(&mut self, category: Category) {
        self.draft.category = category;
    }

    pub fn set_question(&mut self, text: impl Into<String>) {
        self.draft.question = text.into();
    }

    pub fn set_option(&mut self, index: usize, text: impl Into<String>) -> Result<(), NoSuchOption> {
        let slot = self.draft.options.get_mut(index).ok_or(NoSuchOption(index))?;
        *slot = text.into();
        Ok(())
    }

    pub fn set_correct_answer(&mut self, answer: impl Into<String>) {
        self.draft.correct_answer = answer.into();
    }

    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    /// Checks the draft and builds the question to send. Rules run in a fixed
    /// order and the first failure wins.
    pub fn validate(&self) -> Result<Question, ValidationError> {
        validate_draft(&self.draft)
    }
}

pub fn validate_draft(draft: &Draft) -> Result<Question, ValidationError> {
    if draft.question.trim().is_empty() {
        return Err(ValidationError::MissingQuestion);
    }
    if draft.options.iter().any(|o| o.trim().is_empty()) {
        return Err(ValidationError::MissingOption);
    }
    if draft.correct_answer.is_empty()
        || !draft.options.iter().any(|o| *o == draft.correct_answer)
    {
        return Err(ValidationError::MissingCorrectAnswer);
    }
    Ok(Question {
        id: None,
        category: draft.category,
        question: draft.question.clone(),
        options: draft.options.to_vec(),
        correct_answer: draft.correct_answer.clone(),
    })
}
