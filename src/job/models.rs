use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type JobId = i64;

/// A question/answer record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Bumped by every successful update, used to detect concurrent edits.
    pub version: i64,
}

/// Raw submission for create and edit. Every field is optional so that a
/// missing field surfaces as a validation error rather than a body rejection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub id: Option<JobId>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
}

/// Question and answer that passed validation, stored as submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobFields {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        ValidationErrors(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn push(&mut self, field: &'static str, message: &str) {
        self.0.push(FieldError {
            field,
            message: message.to_string(),
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn check_text_field(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &Option<String>,
) -> Option<String> {
    match value {
        None => {
            errors.push(field, "is required");
            None
        }
        Some(s) if s.trim().is_empty() => {
            errors.push(field, "must not be blank");
            None
        }
        Some(s) => Some(s.clone()),
    }
}

impl JobInput {
    pub fn new<Q: Into<String>, A: Into<String>>(question: Q, answer: A) -> JobInput {
        JobInput {
            id: None,
            question: Some(question.into()),
            answer: Some(answer.into()),
            version: None,
        }
    }

    pub fn validate(&self) -> Result<JobFields, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let question = check_text_field(&mut errors, "question", &self.question);
        let answer = check_text_field(&mut errors, "answer", &self.answer);
        match (question, answer) {
            (Some(question), Some(answer)) => Ok(JobFields { question, answer }),
            _ => Err(errors),
        }
    }
}
