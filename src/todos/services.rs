use crate::auth::repo_types::User;
use crate::circles::services::require_member;
use crate::error::ApiError;
use crate::state::AppState;
use crate::todos::dto::{CreateTodoRequest, TodoResponse, UpdateTodoRequest};
use crate::todos::repo;

pub async fn create(
    state: &AppState,
    user: &User,
    req: CreateTodoRequest,
) -> Result<TodoResponse, ApiError> {
    require_member(state, user.id, req.circle_id).await?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("title must not be blank"));
    }

    let todo = repo::create(
        &state.db,
        req.circle_id,
        title,
        req.notes.as_deref(),
        req.due_on,
        user.id,
    )
    .await
    .map_err(ApiError::internal)?;
    Ok(TodoResponse::from(&todo))
}

pub async fn by_circle(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<TodoResponse>, ApiError> {
    require_member(state, user.id, circle_id).await?;
    let todos = repo::list_for_circle(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(todos.iter().map(TodoResponse::from).collect())
}

pub async fn update(
    state: &AppState,
    user: &User,
    req: UpdateTodoRequest,
) -> Result<TodoResponse, ApiError> {
    require_member(state, user.id, req.circle_id).await?;
    let todo = repo::update(
        &state.db,
        req.id,
        req.circle_id,
        req.title.as_deref(),
        req.notes.as_deref(),
        req.due_on,
    )
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::not_found("todo not found"))?;
    Ok(TodoResponse::from(&todo))
}

/// Idempotent: completing an already-completed item reports false.
pub async fn complete(
    state: &AppState,
    user: &User,
    id: i64,
    circle_id: i64,
) -> Result<bool, ApiError> {
    require_member(state, user.id, circle_id).await?;
    repo::complete(&state.db, id, circle_id, user.id)
        .await
        .map_err(ApiError::internal)
}

pub async fn remove(
    state: &AppState,
    user: &User,
    id: i64,
    circle_id: i64,
) -> Result<bool, ApiError> {
    require_member(state, user.id, circle_id).await?;
    repo::remove(&state.db, id, circle_id, user.id)
        .await
        .map_err(ApiError::internal)
}
