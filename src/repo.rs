use serde_json::Value;

use crate::models::{Session, Task, TaskDraft, TaskStatus};
use crate::store::{RemoteError, Row, RowStore, SelectQuery};

pub const TASKS_TABLE: &str = "tasks";

#[derive(Debug)]
pub enum RepoError {
    /// Client-side precondition failure; the remote store was never called.
    Validation(String),
    Remote(RemoteError),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Validation(message) => write!(f, "validation error: {message}"),
            RepoError::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<RemoteError> for RepoError {
    fn from(value: RemoteError) -> Self {
        RepoError::Remote(value)
    }
}

/// Single point of contact with the remote store for task rows. Owns the
/// mapping between wire rows and the in-memory `Task` model.
pub struct TaskRepository<S> {
    store: S,
}

impl<S: RowStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All tasks owned by the session's user.
    pub async fn list_for_user(&self, session: &Session) -> Result<Vec<Task>, RepoError> {
        let query = SelectQuery::new().eq("user_id", &session.user.id);
        let rows = self.store.select(session, TASKS_TABLE, query).await?;
        rows.into_iter()
            .map(task_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepoError::from)
    }

    /// The user's most recently created tasks, newest first.
    pub async fn list_recent(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<Task>, RepoError> {
        let query = SelectQuery::new()
            .eq("user_id", &session.user.id)
            .order_by("created_at", false)
            .limit(limit);
        let rows = self.store.select(session, TASKS_TABLE, query).await?;
        rows.into_iter()
            .map(task_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepoError::from)
    }

    /// Inserts a new task for the session's user. The stored row comes
    /// back with its assigned id.
    pub async fn create(&self, session: &Session, draft: &TaskDraft) -> Result<Task, RepoError> {
        if draft.title.is_empty() {
            return Err(RepoError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let record = serde_json::json!({
            "title": draft.title,
            "description": draft.description,
            "priority": draft.priority.as_str(),
            "status": TaskStatus::ToDo.as_str(),
            "assignee_name": draft.assignee_name,
            "assignee_avatar": "",
            "due_date": draft.due_date,
            "created_at": creation_date(),
            "user_id": session.user.id,
        });
        let row = self.store.insert(session, TASKS_TABLE, &record).await?;
        task_from_row(row).map_err(RepoError::from)
    }

    /// Persists a status transition. Local state is not touched; callers
    /// re-fetch afterwards.
    pub async fn update_status(
        &self,
        session: &Session,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), RepoError> {
        let patch = serde_json::json!({ "status": status.as_str() });
        self.store
            .update(session, TASKS_TABLE, task_id, &patch)
            .await?;
        Ok(())
    }

    /// Inserts imported records one at a time, each awaited before the
    /// next. A rejected record never aborts the rest; callers get one
    /// outcome per record, in input order. Any pre-existing `id` is
    /// dropped so the destination store always assigns a fresh one.
    pub async fn bulk_insert(
        &self,
        session: &Session,
        records: Vec<Value>,
    ) -> Vec<Result<Task, RemoteError>> {
        let mut outcomes = Vec::with_capacity(records.len());
        for mut record in records {
            if let Value::Object(map) = &mut record {
                map.remove("id");
            }
            let outcome = match self.store.insert(session, TASKS_TABLE, &record).await {
                Ok(row) => task_from_row(row),
                Err(err) => Err(err),
            };
            if let Err(err) = &outcome {
                log::warn!("import: record rejected: {err}");
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[cfg(test)]
impl<S> TaskRepository<S> {
    pub(crate) fn store_for_tests(&self) -> &S {
        &self.store
    }
}

fn task_from_row(row: Row) -> Result<Task, RemoteError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn creation_date() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
