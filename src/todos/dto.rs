use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

use crate::todos::repo::Todo;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub circle_id: i64,
    pub title: String,
    pub notes: Option<String>,
    #[serde(default, with = "rfc3339::option")]
    pub due_on: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub id: i64,
    pub circle_id: i64,
    pub title: Option<String>,
    pub notes: Option<String>,
    #[serde(default, with = "rfc3339::option")]
    pub due_on: Option<OffsetDateTime>,
}

/// Complete and remove share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoActionRequest {
    pub id: i64,
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub notes: Option<String>,
    #[serde(with = "rfc3339::option")]
    pub due_on: Option<OffsetDateTime>,
    #[serde(with = "rfc3339::option")]
    pub completed_on: Option<OffsetDateTime>,
    #[serde(with = "rfc3339::option")]
    pub removed_on: Option<OffsetDateTime>,
    #[serde(with = "rfc3339")]
    pub created_on: OffsetDateTime,
}

impl From<&Todo> for TodoResponse {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            notes: todo.notes.clone(),
            due_on: todo.due_on,
            completed_on: todo.completed_on,
            removed_on: todo.removed_on,
            created_on: todo.created_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletedResponse {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}
