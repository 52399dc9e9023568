use axum::{
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::dto::{ActionForm, TodoForm};
use super::views::{
    page, CreateTemplate, DeleteTemplate, EditTemplate, FieldErrors, FormView, IndexTemplate,
    TodoRow,
};
use super::{Todo, UpdateOutcome};
use crate::error::{AppError, AppResult};
use crate::routes::antiforgery::FormGuard;
use crate::state::AppState;

const LIST_PATH: &str = "/todo";

/// `{id}` path segment. Anything that is not an `i32` names no todo.
pub struct TodoId(pub i32);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i32>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| TodoId(id))
            .map_err(|e| {
                tracing::debug!("unparsable todo id: {}", e);
                AppError::NotFound("todo")
            })
    }
}

fn to_list() -> Response {
    Redirect::to(LIST_PATH).into_response()
}

fn updated(outcome: UpdateOutcome, id: i32) -> AppResult<Todo> {
    match outcome {
        UpdateOutcome::Updated(todo) => Ok(todo),
        UpdateOutcome::NotFound => Err(AppError::NotFound("todo")),
        UpdateOutcome::Conflict => Err(AppError::Conflict(id)),
    }
}

async fn find(state: &AppState, id: i32) -> AppResult<Todo> {
    state
        .store
        .get(id)
        .await?
        .ok_or(AppError::NotFound("todo"))
}

/// List every todo, newest first
pub async fn index(State(state): State<AppState>, guard: FormGuard) -> AppResult<Response> {
    let todos = state.store.list_all().await?;

    let template = IndexTemplate {
        todos: todos.iter().map(TodoRow::from).collect(),
        csrf_token: state.antiforgery.issue(&guard)?,
    };

    page(&guard, &template)
}

/// Blank create form
pub async fn create_form(State(state): State<AppState>, guard: FormGuard) -> AppResult<Response> {
    let template = CreateTemplate {
        form: FormView::default(),
        errors: FieldErrors::default(),
        csrf_token: state.antiforgery.issue(&guard)?,
    };

    page(&guard, &template)
}

/// Create a todo
pub async fn create(
    State(state): State<AppState>,
    guard: FormGuard,
    Form(form): Form<TodoForm>,
) -> AppResult<Response> {
    state.antiforgery.verify(&guard, &form.csrf_token)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            tracing::warn!(errors = errors.len(), "create rejected by validation");
            let template = CreateTemplate {
                form: FormView::from(&form),
                errors: FieldErrors::from(errors.as_slice()),
                csrf_token: state.antiforgery.issue(&guard)?,
            };
            return page(&guard, &template);
        }
    };

    let todo = state.store.insert(input).await?;
    tracing::info!(todo_id = todo.id, "created todo");

    Ok(to_list())
}

/// Edit form populated from the stored row
pub async fn edit_form(
    State(state): State<AppState>,
    guard: FormGuard,
    TodoId(id): TodoId,
) -> AppResult<Response> {
    let todo = find(&state, id).await?;

    let template = EditTemplate {
        id: todo.id,
        version: todo.version,
        form: FormView::from(&todo),
        errors: FieldErrors::default(),
        csrf_token: state.antiforgery.issue(&guard)?,
    };

    page(&guard, &template)
}

/// Save an edited todo
pub async fn edit(
    State(state): State<AppState>,
    guard: FormGuard,
    TodoId(id): TodoId,
    Form(form): Form<TodoForm>,
) -> AppResult<Response> {
    state.antiforgery.verify(&guard, &form.csrf_token)?;

    if form.id != Some(id) {
        return Err(AppError::NotFound("todo"));
    }

    let mut todo = find(&state, id).await?;
    // The version the user was looking at, not the one just read.
    let version = form.version.unwrap_or(todo.version);

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            tracing::warn!(todo_id = id, errors = errors.len(), "edit rejected by validation");
            let template = EditTemplate {
                id,
                version,
                form: FormView::from(&form),
                errors: FieldErrors::from(errors.as_slice()),
                csrf_token: state.antiforgery.issue(&guard)?,
            };
            return page(&guard, &template);
        }
    };

    todo.apply(input);
    todo.version = version;

    let saved = updated(state.store.update(&todo).await?, id)?;
    tracing::info!(todo_id = saved.id, "updated todo");

    Ok(to_list())
}

/// Delete confirmation page
pub async fn delete_form(
    State(state): State<AppState>,
    guard: FormGuard,
    TodoId(id): TodoId,
) -> AppResult<Response> {
    let todo = find(&state, id).await?;

    let template = DeleteTemplate {
        todo: TodoRow::from(&todo),
        csrf_token: state.antiforgery.issue(&guard)?,
    };

    page(&guard, &template)
}

/// Delete a todo; already-gone rows are fine
pub async fn delete(
    State(state): State<AppState>,
    guard: FormGuard,
    TodoId(id): TodoId,
    Form(form): Form<ActionForm>,
) -> AppResult<Response> {
    state.antiforgery.verify(&guard, &form.csrf_token)?;

    let removed = state.store.remove(id).await?;
    tracing::info!(todo_id = id, removed, "deleted todo");

    Ok(to_list())
}

/// Flip a todo's completed state
pub async fn toggle(
    State(state): State<AppState>,
    guard: FormGuard,
    TodoId(id): TodoId,
    Form(form): Form<ActionForm>,
) -> AppResult<Response> {
    state.antiforgery.verify(&guard, &form.csrf_token)?;

    let mut todo = find(&state, id).await?;
    todo.is_completed = !todo.is_completed;

    let saved = updated(state.store.update(&todo).await?, id)?;
    tracing::info!(todo_id = id, is_completed = saved.is_completed, "toggled todo");

    Ok(to_list())
}
