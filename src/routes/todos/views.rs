use askama::Template;
use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
};

use super::dto::TodoForm;
use super::{Todo, ValidationError};
use crate::error::AppResult;
use crate::routes::antiforgery::FormGuard;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One row of the list and delete pages, pre-formatted for display.
pub struct TodoRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: String,
    pub due_date: String,
}

impl From<&Todo> for TodoRow {
    fn from(t: &Todo) -> Self {
        Self {
            id: t.id,
            title: t.title.clone(),
            description: t.description.clone().unwrap_or_default(),
            is_completed: t.is_completed,
            created_at: t.created_at.format(DISPLAY_FORMAT).to_string(),
            due_date: t
                .due_date
                .map(|d| d.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

/// Values shown in the create/edit inputs.
#[derive(Default)]
pub struct FormView {
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub due_date: String,
}

impl From<&Todo> for FormView {
    fn from(t: &Todo) -> Self {
        Self {
            title: t.title.clone(),
            description: t.description.clone().unwrap_or_default(),
            is_completed: t.is_completed,
            due_date: t
                .due_date
                .map(|d| d.format(INPUT_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

// Re-show exactly what was submitted.
impl From<&TodoForm> for FormView {
    fn from(f: &TodoForm) -> Self {
        Self {
            title: f.title.clone(),
            description: f.description.clone(),
            is_completed: f.is_completed(),
            due_date: f.due_date.clone(),
        }
    }
}

/// Per-field messages; empty means the field is fine.
#[derive(Default)]
pub struct FieldErrors {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl From<&[ValidationError]> for FieldErrors {
    fn from(errors: &[ValidationError]) -> Self {
        let mut out = Self::default();
        for e in errors {
            let slot = match e.field() {
                "title" => &mut out.title,
                "description" => &mut out.description,
                _ => &mut out.due_date,
            };
            *slot = e.to_string();
        }
        out
    }
}

#[derive(Template)]
#[template(path = "todo/index.html")]
pub struct IndexTemplate {
    pub todos: Vec<TodoRow>,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "todo/create.html")]
pub struct CreateTemplate {
    pub form: FormView,
    pub errors: FieldErrors,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "todo/edit.html")]
pub struct EditTemplate {
    pub id: i32,
    pub version: i64,
    pub form: FormView,
    pub errors: FieldErrors,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "todo/delete.html")]
pub struct DeleteTemplate {
    pub todo: TodoRow,
    pub csrf_token: String,
}

/// Render `template` and (re)install the anti-forgery cookie.
pub fn page<T: Template>(guard: &FormGuard, template: &T) -> AppResult<Response> {
    let html = template.render()?;
    Ok(([(header::SET_COOKIE, guard.set_cookie()?)], Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn todo() -> Todo {
        Todo {
            id: 1,
            title: "Buy <milk>".into(),
            description: None,
            is_completed: false,
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 5, 0).unwrap(),
            due_date: Some(Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap()),
            version: 1,
        }
    }

    #[test]
    fn test_index_escapes_and_formats() {
        let html = IndexTemplate {
            todos: vec![TodoRow::from(&todo())],
            csrf_token: "tok".into(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Buy &#60;milk&#62;") || html.contains("Buy &lt;milk&gt;"));
        assert!(html.contains("2024-03-02 08:05"));
        assert!(html.contains("/todo/toggle/1"));
    }

    #[test]
    fn test_index_empty_state() {
        let html = IndexTemplate {
            todos: Vec::new(),
            csrf_token: "tok".into(),
        }
        .render()
        .unwrap();

        assert!(html.contains("Nothing to do"));
    }

    #[test]
    fn test_edit_form_prefilled() {
        let t = todo();
        let html = EditTemplate {
            id: t.id,
            version: t.version,
            form: FormView::from(&t),
            errors: FieldErrors::default(),
            csrf_token: "tok".into(),
        }
        .render()
        .unwrap();

        assert!(html.contains(r#"value="2024-03-09T17:00""#));
        assert!(html.contains(r#"name="version" value="1""#));
    }

    #[test]
    fn test_field_errors_routed() {
        let errors = [
            ValidationError::Required { field: "title" },
            ValidationError::InvalidDate { field: "due date" },
        ];
        let fe = FieldErrors::from(&errors[..]);

        assert_eq!(fe.title, "The title field is required.");
        assert!(fe.description.is_empty());
        assert!(!fe.due_date.is_empty());
    }
}
