use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::{
    CircleForUserResponse, CircleResponse, ConfirmRequest, ConfirmResponse, CreateCircleRequest,
    DeactivateRequest, DeactivateResponse, ImageResponse, InviteRequest, LeaveRequest,
    LeaveResponse,
};
use crate::circles::services;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/circle/create", post(create))
        .route("/circle/byUser", get(by_user))
        .route("/circle/invite", post(invite))
        .route("/circle/confirm", post(confirm))
        .route("/circle/leave", post(leave))
        .route("/circle/deactivate", post(deactivate))
        .route("/circle/uploadImage", post(upload_image))
}

#[instrument(skip(state, current, payload))]
async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreateCircleRequest>,
) -> Result<Transport<CircleResponse>, ApiError> {
    let circle = services::create_circle(&state, &current.0, payload).await?;
    Ok(Transport::ok(circle))
}

#[instrument(skip(state, current))]
async fn by_user(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Transport<Vec<CircleForUserResponse>>, ApiError> {
    let circles = services::circles_for_user(&state, current.0.id).await?;
    Ok(Transport::ok(circles))
}

#[instrument(skip(state, current, payload))]
async fn invite(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<InviteRequest>,
) -> Result<Transport<()>, ApiError> {
    services::invite(&state, &current.0, payload).await?;
    Ok(Transport::empty())
}

#[instrument(skip(state, current, payload))]
async fn confirm(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Transport<ConfirmResponse>, ApiError> {
    let confirmed = services::confirm(&state, current.0.id, payload.circle_id).await?;
    Ok(Transport::ok(ConfirmResponse { confirmed }))
}

#[instrument(skip(state, current, payload))]
async fn leave(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<LeaveRequest>,
) -> Result<Transport<LeaveResponse>, ApiError> {
    let left = services::leave(&state, current.0.id, payload.circle_id).await?;
    Ok(Transport::ok(LeaveResponse { left }))
}

#[instrument(skip(state, current, payload))]
async fn deactivate(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<DeactivateRequest>,
) -> Result<Transport<DeactivateResponse>, ApiError> {
    let response = services::deactivate(&state, &current.0, payload.circle_id).await?;
    Ok(Transport::ok(response))
}

/// Multipart with a `circleId` text field and an `image` file field.
#[instrument(skip(state, current, multipart))]
async fn upload_image(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> Result<Transport<ImageResponse>, ApiError> {
    let mut circle_id: Option<i64> = None;
    let mut image: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("multipart body expected"))?
    {
        match field.name() {
            Some("circleId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation("circleId could not be read"))?;
                circle_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::validation("circleId must be an integer"))?,
                );
            }
            Some("image") => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::validation("image could not be read"))?,
                );
            }
            _ => continue,
        }
    }

    let circle_id = circle_id.ok_or_else(|| ApiError::validation("circleId field missing"))?;
    let image = image.ok_or_else(|| ApiError::validation("image field missing"))?;

    let path = services::upload_image(&state, &current.0, circle_id, image).await?;
    Ok(Transport::ok(ImageResponse { path }))
}
