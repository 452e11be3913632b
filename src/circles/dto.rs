use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

use crate::circles::repo::{Circle, CircleForUser};

/// Query string for the circle-scoped listings (`?circleId=`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleQuery {
    pub circle_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCircleRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleResponse {
    pub id: i64,
    pub name: String,
    pub image_path: Option<String>,
}

impl From<&Circle> for CircleResponse {
    fn from(circle: &Circle) -> Self {
        Self {
            id: circle.id,
            name: circle.name.clone(),
            image_path: circle.image_path.clone(),
        }
    }
}

/// Listing entry; `joinedOn` null means the invitation is still pending.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleForUserResponse {
    pub id: i64,
    pub name: String,
    pub image_path: Option<String>,
    pub is_owner: bool,
    pub is_admin: bool,
    #[serde(with = "rfc3339::option")]
    pub joined_on: Option<OffsetDateTime>,
}

impl From<&CircleForUser> for CircleForUserResponse {
    fn from(row: &CircleForUser) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            image_path: row.image_path.clone(),
            is_owner: row.is_owner,
            is_admin: row.is_admin,
            joined_on: row.joined_on,
        }
    }
}

/// `baseUrl` lets a client front-end receive the invitation link on its
/// own origin; absent, the configured application base URL is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub circle_id: i64,
    pub email: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub left: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateRequest {
    pub circle_id: i64,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub deactivated: bool,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub path: String,
}
