use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::error::ApiError;
use crate::polls::dto::{
    CreatePollRequest, PollResponse, RemovePollRequest, RemovedResponse, VoteRequest,
};
use crate::polls::services;
use crate::state::AppState;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poll/create", post(create))
        .route("/poll/byCircle", get(by_circle))
        .route("/poll/vote", post(vote))
        .route("/poll/remove", post(remove))
}

#[instrument(skip(state, current, payload))]
async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreatePollRequest>,
) -> Result<Transport<PollResponse>, ApiError> {
    let poll = services::create(&state, &current.0, payload).await?;
    Ok(Transport::ok(poll))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<PollResponse>>, ApiError> {
    let polls = services::by_circle(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(polls))
}

#[instrument(skip(state, current, payload))]
async fn vote(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<VoteRequest>,
) -> Result<Transport<()>, ApiError> {
    services::vote(&state, &current.0, payload).await?;
    Ok(Transport::empty())
}

#[instrument(skip(state, current, payload))]
async fn remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<RemovePollRequest>,
) -> Result<Transport<RemovedResponse>, ApiError> {
    let removed = services::remove(&state, &current.0, payload).await?;
    Ok(Transport::ok(RemovedResponse { removed }))
}
