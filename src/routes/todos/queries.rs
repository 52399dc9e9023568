use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use super::{Todo, TodoInput, UpdateOutcome};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence gateway for the `todos` table.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every todo, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Todo>>;

    async fn get(&self, id: i32) -> StoreResult<Option<Todo>>;

    /// Stamps `created_at` with the current time and assigns a fresh id.
    async fn insert(&self, input: TodoInput) -> StoreResult<Todo>;

    /// Overwrite the row matching `todo.id` if its version still equals
    /// `todo.version`. `created_at` is never written.
    async fn update(&self, todo: &Todo) -> StoreResult<UpdateOutcome>;

    /// Returns whether a row was deleted.
    async fn remove(&self, id: i32) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;
}

pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// `xmin` changes on every write to a row, which makes it a free row version.

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, is_completed, created_at, due_date,
                   xmin::text::bigint AS version
            FROM todos
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn get(&self, id: i32) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, is_completed, created_at, due_date,
                   xmin::text::bigint AS version
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn insert(&self, input: TodoInput) -> StoreResult<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, is_completed, created_at, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, is_completed, created_at, due_date,
                      xmin::text::bigint AS version
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.is_completed)
        .bind(Utc::now())
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn update(&self, todo: &Todo) -> StoreResult<UpdateOutcome> {
        let updated = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET
                title = $3,
                description = $4,
                is_completed = $5,
                due_date = $6
            WHERE id = $1 AND xmin::text::bigint = $2
            RETURNING id, title, description, is_completed, created_at, due_date,
                      xmin::text::bigint AS version
            "#,
        )
        .bind(todo.id)
        .bind(todo.version)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.is_completed)
        .bind(todo.due_date)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(t) = updated {
            return Ok(UpdateOutcome::Updated(t));
        }

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM todos WHERE id = $1)")
            .bind(todo.id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(UpdateOutcome::Conflict)
        } else {
            Ok(UpdateOutcome::NotFound)
        }
    }

    async fn remove(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
