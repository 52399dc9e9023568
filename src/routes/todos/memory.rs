//! In-memory `TodoStore` for router tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::queries::{StoreResult, TodoStore};
use super::{Todo, TodoInput, UpdateOutcome};

#[derive(Default)]
pub struct MemoryTodoStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<Todo>,
    next_id: i32,
    next_version: i64,
}

impl Inner {
    fn bump_version(&mut self) -> i64 {
        self.next_version += 1;
        self.next_version
    }
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    /// Store `todo` as given, `created_at` included.
    pub async fn insert_row(&self, todo: Todo) {
        let mut inner = self.inner.lock().await;
        inner.next_id = inner.next_id.max(todo.id);
        inner.next_version = inner.next_version.max(todo.version);
        inner.rows.push(todo);
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        let mut rows = self.inner.lock().await.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> StoreResult<Option<Todo>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, input: TodoInput) -> StoreResult<Todo> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let version = inner.bump_version();

        let todo = Todo {
            id: inner.next_id,
            title: input.title,
            description: input.description,
            is_completed: input.is_completed,
            created_at: Utc::now(),
            due_date: input.due_date,
            version,
        };
        inner.rows.push(todo.clone());

        Ok(todo)
    }

    async fn update(&self, todo: &Todo) -> StoreResult<UpdateOutcome> {
        let mut inner = self.inner.lock().await;
        let version = inner.bump_version();

        let Some(row) = inner.rows.iter_mut().find(|t| t.id == todo.id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if row.version != todo.version {
            return Ok(UpdateOutcome::Conflict);
        }

        row.title = todo.title.clone();
        row.description = todo.description.clone();
        row.is_completed = todo.is_completed;
        row.due_date = todo.due_date;
        row.version = version;

        Ok(UpdateOutcome::Updated(row.clone()))
    }

    async fn remove(&self, id: i32) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner.rows.retain(|t| t.id != id);
        Ok(inner.rows.len() != before)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
