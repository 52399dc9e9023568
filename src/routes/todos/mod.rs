pub mod dto;
pub mod queries;
pub mod routes;
pub mod views;

#[cfg(test)]
pub mod memory;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

// MODELS

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    /// Row version used for optimistic concurrency; changes on every write.
    pub version: i64,
}

/// Validated values for a new or edited todo.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TodoInput {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
}

impl Todo {
    /// Overwrite the editable fields. `id`, `created_at` and `version` are kept.
    pub fn apply(&mut self, input: TodoInput) {
        self.title = input.title;
        self.description = input.description;
        self.is_completed = input.is_completed;
        self.due_date = input.due_date;
    }
}

/// Result of a versioned update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Todo),
    /// No row with that id.
    NotFound,
    /// The row exists but its version moved on since it was read.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("The {field} field is required.")]
    Required { field: &'static str },

    #[error("The {field} field must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },

    #[error("The {field} field is not a valid date and time.")]
    InvalidDate { field: &'static str },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } | Self::InvalidDate { field } => {
                field
            }
        }
    }
}

// HELPER FUNCTIONS

/// Title is required and trimmed; length is counted in characters.
pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();

    if title.is_empty() {
        return Err(ValidationError::Required { field: "title" });
    }

    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "title",
            max: TITLE_MAX_LEN,
        });
    }

    Ok(title.to_string())
}

/// Empty input means no description.
pub fn validate_description(raw: &str) -> Result<Option<String>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    if raw.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "description",
            max: DESCRIPTION_MAX_LEN,
        });
    }

    Ok(Some(raw.to_string()))
}

/// Accepts `datetime-local` values (`2024-05-01T09:30`, optionally with
/// seconds) read as UTC, or a full RFC 3339 timestamp.
pub fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Some(naive.and_utc()))
        .ok_or(ValidationError::InvalidDate { field: "due date" })
}
