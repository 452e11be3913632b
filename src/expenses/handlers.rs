use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::error::ApiError;
use crate::expenses::dto::{
    AddBillRequest, AddCategoryRequest, BillActionRequest, BillResponse, CategoryResponse,
    RemovedResponse,
};
use crate::expenses::services;
use crate::state::AppState;
use crate::transport::Transport;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::instrument;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/expenses/addCategory", post(add_category))
        .route("/expenses/categories", get(categories))
        .route("/expenses/addBill", post(add_bill))
        .route("/expenses/byCircle", get(by_circle))
        .route("/expenses/removeBill", post(remove_bill))
}

#[instrument(skip(state, current, request))]
async fn add_category(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddCategoryRequest>,
) -> Result<Transport<CategoryResponse>, ApiError> {
    let category = services::add_category(&state, &current.0, request).await?;
    Ok(Transport::ok(category))
}

#[instrument(skip(state, current))]
async fn categories(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<CategoryResponse>>, ApiError> {
    let categories = services::categories(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(categories))
}

#[instrument(skip(state, current, request))]
async fn add_bill(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddBillRequest>,
) -> Result<Transport<BillResponse>, ApiError> {
    let bill = services::add_bill(&state, &current.0, request).await?;
    Ok(Transport::ok(bill))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<BillResponse>>, ApiError> {
    let bills = services::bills_for_circle(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(bills))
}

#[instrument(skip(state, current, request))]
async fn remove_bill(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<BillActionRequest>,
) -> Result<Transport<RemovedResponse>, ApiError> {
    let removed = services::remove_bill(&state, &current.0, request).await?;
    Ok(Transport::ok(removed))
}
