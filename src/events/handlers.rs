use axum::{
    extract::{Multipart, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::error::ApiError;
use crate::events::dto::{
    CreateEventRequest, EventActionRequest, EventPhotoResponse, EventQuery, EventResponse,
    JoinedResponse, LeftResponse,
};
use crate::events::services;
use crate::state::AppState;
use crate::transport::Transport;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event/create", post(create))
        .route("/event/byCircle", get(by_circle))
        .route("/event/join", post(join))
        .route("/event/leave", post(leave))
        .route("/event/photo", post(upload_photo))
        .route("/event/photos", get(photos))
}

#[instrument(skip(state, current, payload))]
async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Transport<EventResponse>, ApiError> {
    let event = services::create(&state, &current.0, payload).await?;
    Ok(Transport::ok(event))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<EventResponse>>, ApiError> {
    let events = services::by_circle(&state, &current.0, query.circle_id).await?;
    Ok(Transport::ok(events))
}

#[instrument(skip(state, current, payload))]
async fn join(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<EventActionRequest>,
) -> Result<Transport<JoinedResponse>, ApiError> {
    let joined = services::join(&state, &current.0, payload.event_id).await?;
    Ok(Transport::ok(JoinedResponse { joined }))
}

#[instrument(skip(state, current, payload))]
async fn leave(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<EventActionRequest>,
) -> Result<Transport<LeftResponse>, ApiError> {
    let left = services::leave(&state, &current.0, payload.event_id).await?;
    Ok(Transport::ok(LeftResponse { left }))
}

/// Multipart with an `eventId` text field and an `image` file field.
#[instrument(skip(state, current, multipart))]
async fn upload_photo(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> Result<Transport<EventPhotoResponse>, ApiError> {
    let mut event_id: Option<i64> = None;
    let mut image: Option<bytes::Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("multipart body expected"))?
    {
        match field.name() {
            Some("eventId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::validation("eventId could not be read"))?;
                event_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::validation("eventId must be an integer"))?,
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

    let event_id = event_id.ok_or_else(|| ApiError::validation("eventId field missing"))?;
    let image = image.ok_or_else(|| ApiError::validation("image field missing"))?;

    let photo = services::add_photo(&state, &current.0, event_id, image).await?;
    Ok(Transport::ok(photo))
}

#[instrument(skip(state, current))]
async fn photos(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<EventQuery>,
) -> Result<Transport<Vec<EventPhotoResponse>>, ApiError> {
    let photos = services::photos(&state, &current.0, query.event_id).await?;
    Ok(Transport::ok(photos))
}
