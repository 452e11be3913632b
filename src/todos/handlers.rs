use axum::{
    extract::{Query, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::error::ApiError;
use crate::state::AppState;
use crate::todos::dto::{
    CompletedResponse, CreateTodoRequest, RemovedResponse, TodoActionRequest, TodoResponse,
    UpdateTodoRequest,
};
use crate::todos::services;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todo/create", post(create))
        .route("/todo/byCircle", get(by_circle))
        .route("/todo/update", put(update))
        .route("/todo/complete", post(complete))
        .route("/todo/remove", post(remove))
}

#[instrument(skip(state, current, payload))]
async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<Transport<TodoResponse>, ApiError> {
    let todo = services::create(&state, &current.0, payload).await?;
    Ok(Transport::ok(todo))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<TodoResponse>>, ApiError> {
    let todos = services::by_circle(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(todos))
}

#[instrument(skip(state, current, payload))]
async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Transport<TodoResponse>, ApiError> {
    let todo = services::update(&state, &current.0, payload).await?;
    Ok(Transport::ok(todo))
}

#[instrument(skip(state, current, payload))]
async fn complete(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<TodoActionRequest>,
) -> Result<Transport<CompletedResponse>, ApiError> {
    let completed = services::complete(&state, &current.0, payload.id, payload.circle_id).await?;
    Ok(Transport::ok(CompletedResponse { completed }))
}

#[instrument(skip(state, current, payload))]
async fn remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<TodoActionRequest>,
) -> Result<Transport<RemovedResponse>, ApiError> {
    let removed = services::remove(&state, &current.0, payload.id, payload.circle_id).await?;
    Ok(Transport::ok(RemovedResponse { removed }))
}
