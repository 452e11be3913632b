use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

use crate::events::repo::{Event, EventPhoto};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub circle_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "rfc3339")]
    pub starts_at: OffsetDateTime,
    pub location: Option<String>,
}

/// Join and leave share this shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActionRequest {
    pub event_id: i64,
}

/// Query string for the photo listing (`?eventId=`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub event_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "rfc3339")]
    pub starts_at: OffsetDateTime,
    pub location: Option<String>,
    #[serde(with = "rfc3339")]
    pub created_on: OffsetDateTime,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            starts_at: event.starts_at,
            location: event.location.clone(),
            created_on: event.created_on,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JoinedResponse {
    pub joined: bool,
}

#[derive(Debug, Serialize)]
pub struct LeftResponse {
    pub left: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPhotoResponse {
    pub id: i64,
    pub path: String,
    #[serde(with = "rfc3339")]
    pub added_on: OffsetDateTime,
}

impl From<&EventPhoto> for EventPhotoResponse {
    fn from(photo: &EventPhoto) -> Self {
        Self {
            id: photo.id,
            path: photo.path.clone(),
            added_on: photo.added_on,
        }
    }
}
