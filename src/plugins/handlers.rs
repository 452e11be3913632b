use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::error::ApiError;
use crate::plugins::dto::{AttachPluginRequest, AttachedPluginResponse, PluginResponse};
use crate::plugins::services;
use crate::state::AppState;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plugin/getPlugins", get(get_plugins))
        .route("/plugin/getPluginsFromCircle", get(get_plugins_from_circle))
        .route("/plugin/addPluginFromCircle", post(add_plugin))
        .route("/plugin/removePluginFromCircle", post(remove_plugin))
}

#[instrument(skip(state, _current))]
async fn get_plugins(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Transport<Vec<PluginResponse>>, ApiError> {
    let plugins = services::catalog(&state).await?;
    Ok(Transport::ok(plugins))
}

#[instrument(skip(state, current))]
async fn get_plugins_from_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<AttachedPluginResponse>>, ApiError> {
    let plugins = services::for_circle(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(plugins))
}

#[instrument(skip(state, current, payload))]
async fn add_plugin(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<AttachPluginRequest>,
) -> Result<Transport<()>, ApiError> {
    services::attach(&state, &current.0, payload.id, payload.circle_id).await?;
    Ok(Transport::empty())
}

#[instrument(skip(state, current, payload))]
async fn remove_plugin(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<AttachPluginRequest>,
) -> Result<Transport<()>, ApiError> {
    services::detach(&state, &current.0, payload.id, payload.circle_id).await?;
    Ok(Transport::empty())
}
