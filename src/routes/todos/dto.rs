use serde::Deserialize;

use super::{parse_due_date, validate_description, validate_title, TodoInput, ValidationError};

/// Create/edit form as posted by the browser. Everything arrives as text so a
/// bad value can be shown back to the user instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TodoForm {
    pub id: Option<i32>,
    pub version: Option<i64>,
    pub title: String,
    pub description: String,
    /// Checkbox: present only when ticked.
    pub is_completed: Option<String>,
    pub due_date: String,
    pub csrf_token: String,
}

impl TodoForm {
    pub fn is_completed(&self) -> bool {
        matches!(self.is_completed.as_deref(), Some(v) if v != "false")
    }

    /// Validate every field, collecting all failures.
    pub fn validate(&self) -> Result<TodoInput, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let title = validate_title(&self.title).map_err(|e| errors.push(e)).ok();
        let description = validate_description(&self.description)
            .map_err(|e| errors.push(e))
            .ok();
        let due_date = parse_due_date(&self.due_date).map_err(|e| errors.push(e)).ok();

        match (title, description, due_date) {
            (Some(title), Some(description), Some(due_date)) if errors.is_empty() => Ok(TodoInput {
                title,
                description,
                is_completed: self.is_completed(),
                due_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of the delete and toggle forms.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionForm {
    pub csrf_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str) -> TodoForm {
        TodoForm {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_form_is_valid() {
        let input = form("Buy milk").validate().unwrap();

        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.description, None);
        assert!(!input.is_completed);
        assert_eq!(input.due_date, None);
    }

    #[test]
    fn test_checkbox_values() {
        let mut f = form("x");
        assert!(!f.is_completed());

        f.is_completed = Some("true".into());
        assert!(f.is_completed());

        f.is_completed = Some("on".into());
        assert!(f.is_completed());

        f.is_completed = Some("false".into());
        assert!(!f.is_completed());
    }

    #[test]
    fn test_collects_every_error() {
        let f = TodoForm {
            title: String::new(),
            description: "d".repeat(501),
            due_date: "soon".into(),
            ..Default::default()
        };

        let errors = f.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["title", "description", "due date"]);
    }
}
