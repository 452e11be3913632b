use crate::auth::extractors::CurrentUser;
use crate::circles::dto::CircleQuery;
use crate::circles::services::require_member;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tracking::repo::{self, LocationPoint, MemberLocation};
use crate::transport::Transport;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tracking/record", post(record))
        .route("/tracking/byCircle", get(by_circle))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordRequest {
    circle_id: i64,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordedResponse {
    #[serde(with = "rfc3339")]
    recorded_on: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberLocationResponse {
    user_id: Uuid,
    first_name: String,
    last_name: String,
    latitude: f64,
    longitude: f64,
    #[serde(with = "rfc3339")]
    recorded_on: OffsetDateTime,
}

impl From<&MemberLocation> for MemberLocationResponse {
    fn from(location: &MemberLocation) -> Self {
        Self {
            user_id: location.user_id,
            first_name: location.first_name.clone(),
            last_name: location.last_name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            recorded_on: location.recorded_on,
        }
    }
}

fn position_problems(latitude: f64, longitude: f64) -> Vec<String> {
    let mut problems = Vec::new();
    if !(-90.0..=90.0).contains(&latitude) {
        problems.push("latitude must be between -90 and 90".to_string());
    }
    if !(-180.0..=180.0).contains(&longitude) {
        problems.push("longitude must be between -180 and 180".to_string());
    }
    problems
}

#[instrument(skip(state, current, request))]
async fn record(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<RecordRequest>,
) -> Result<Transport<RecordedResponse>, ApiError> {
    let problems = position_problems(request.latitude, request.longitude);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }
    require_member(&state, current.0.id, request.circle_id).await?;

    let point: LocationPoint = repo::record(
        &state.db,
        request.circle_id,
        current.0.id,
        request.latitude,
        request.longitude,
    )
    .await
    .map_err(ApiError::internal)?;

    Ok(Transport::ok(RecordedResponse {
        recorded_on: point.recorded_on,
    }))
}

#[instrument(skip(state, current))]
async fn by_circle(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CircleQuery>,
) -> Result<Transport<Vec<MemberLocationResponse>>, ApiError> {
    require_member(&state, current.0.id, query.circle_id).await?;
    let locations = repo::latest_per_member(&state.db, query.circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(Transport::ok(
        locations.iter().map(MemberLocationResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_outside_the_globe_are_rejected() {
        assert!(position_problems(90.5, 0.0).len() == 1);
        assert!(position_problems(0.0, -181.0).len() == 1);
        assert_eq!(position_problems(91.0, 200.0).len(), 2);
    }

    #[test]
    fn boundary_positions_are_accepted() {
        assert!(position_problems(90.0, 180.0).is_empty());
        assert!(position_problems(-90.0, -180.0).is_empty());
        assert!(position_problems(52.52, 13.405).is_empty());
    }
}
