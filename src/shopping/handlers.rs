use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::circles::services::require_member;
use crate::error::ApiError;
use crate::shopping::repo::{self, ShoppingItem};
use crate::state::AppState;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shoppingList/add", post(add))
        .route("/shoppingList/byCircle", get(by_circle))
        .route("/shoppingList/bought", post(bought))
        .route("/shoppingList/remove", post(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub circle_id: i64,
    pub name: String,
    pub quantity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemActionRequest {
    pub id: i64,
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItemResponse {
    pub id: i64,
    pub name: String,
    pub quantity: Option<String>,
    #[serde(with = "rfc3339::option")]
    pub bought_on: Option<OffsetDateTime>,
    #[serde(with = "rfc3339::option")]
    pub removed_on: Option<OffsetDateTime>,
    #[serde(with = "rfc3339")]
    pub created_on: OffsetDateTime,
}

impl From<&ShoppingItem> for ShoppingItemResponse {
    fn from(item: &ShoppingItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity.clone(),
            bought_on: item.bought_on,
            removed_on: item.removed_on,
            created_on: item.created_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BoughtResponse {
    pub bought: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

#[instrument(skip(state, current, payload))]
async fn add(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<Transport<ShoppingItemResponse>, ApiError> {
    require_member(&state, current.0.id, payload.circle_id).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be blank"));
    }

    let item = repo::add(
        &state.db,
        payload.circle_id,
        name,
        payload.quantity.as_deref(),
        current.0.id,
    )
    .await
    .map_err(ApiError::internal)?;
    Ok(Transport::ok(ShoppingItemResponse::from(&item)))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<ShoppingItemResponse>>, ApiError> {
    require_member(&state, current.0.id, query.circle_id).await?;
    let items = repo::list_for_circle(&state.db, query.circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Transport::ok(
        items.iter().map(ShoppingItemResponse::from).collect(),
    ))
}

#[instrument(skip(state, current, payload))]
async fn bought(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ItemActionRequest>,
) -> Result<Transport<BoughtResponse>, ApiError> {
    require_member(&state, current.0.id, payload.circle_id).await?;
    let bought = repo::mark_bought(&state.db, payload.id, payload.circle_id, current.0.id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Transport::ok(BoughtResponse { bought }))
}

#[instrument(skip(state, current, payload))]
async fn remove(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ItemActionRequest>,
) -> Result<Transport<RemovedResponse>, ApiError> {
    require_member(&state, current.0.id, payload.circle_id).await?;
    let removed = repo::remove(&state.db, payload.id, payload.circle_id, current.0.id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Transport::ok(RemovedResponse { removed }))
}
