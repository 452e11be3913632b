use crate::auth::repo_types::User;
use crate::circles::services::require_member;
use crate::error::ApiError;
use crate::events::dto::{CreateEventRequest, EventPhotoResponse, EventResponse};
use crate::events::repo::{self, Event};
use crate::state::AppState;
use crate::uploads;

/// Loads the event and gates on membership in its circle. The event id is
/// the only thing clients send for join/leave/photos, so the circle is
/// always derived server-side.
async fn event_for_member(
    state: &AppState,
    user: &User,
    event_id: i64,
) -> Result<Event, ApiError> {
    let event = repo::find(&state.db, event_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("event not found"))?;
    require_member(state, user.id, event.circle_id).await?;
    Ok(event)
}

pub async fn create(
    state: &AppState,
    user: &User,
    req: CreateEventRequest,
) -> Result<EventResponse, ApiError> {
    require_member(state, user.id, req.circle_id).await?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("title must not be blank"));
    }

    let event = repo::create(
        &state.db,
        req.circle_id,
        title,
        req.description.as_deref(),
        req.starts_at,
        req.location.as_deref(),
        user.id,
    )
    .await
    .map_err(ApiError::internal)?;
    Ok(EventResponse::from(&event))
}

pub async fn by_circle(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<EventResponse>, ApiError> {
    require_member(state, user.id, circle_id).await?;
    let events = repo::list_upcoming(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(events.iter().map(EventResponse::from).collect())
}

/// Idempotent: joining twice reports false the second time.
pub async fn join(state: &AppState, user: &User, event_id: i64) -> Result<bool, ApiError> {
    let event = event_for_member(state, user, event_id).await?;
    repo::join(&state.db, event.id, user.id)
        .await
        .map_err(ApiError::internal)
}

pub async fn leave(state: &AppState, user: &User, event_id: i64) -> Result<bool, ApiError> {
    let event = event_for_member(state, user, event_id).await?;
    repo::leave(&state.db, event.id, user.id)
        .await
        .map_err(ApiError::internal)
}

pub async fn add_photo(
    state: &AppState,
    user: &User,
    event_id: i64,
    body: bytes::Bytes,
) -> Result<EventPhotoResponse, ApiError> {
    let event = event_for_member(state, user, event_id).await?;
    let path = uploads::store_jpeg(state.storage.as_ref(), "events", body).await?;
    let photo = repo::add_photo(&state.db, event.id, &path, user.id)
        .await
        .map_err(ApiError::internal)?;
    Ok(EventPhotoResponse::from(&photo))
}

pub async fn photos(
    state: &AppState,
    user: &User,
    event_id: i64,
) -> Result<Vec<EventPhotoResponse>, ApiError> {
    let event = event_for_member(state, user, event_id).await?;
    let photos = repo::list_photos(&state.db, event.id)
        .await
        .map_err(ApiError::internal)?;
    Ok(photos.iter().map(EventPhotoResponse::from).collect())
}
