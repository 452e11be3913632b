use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform response wrapper used by every endpoint.
///
/// Serializes as `{"status": {"id": .., "errors": ..}, "data": ..}` where
/// `errors` is a list or null and `data` is omitted entirely (never null)
/// whenever errors are present.
#[derive(Debug, Serialize)]
pub struct Transport<T> {
    pub status: TransportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct TransportStatus {
    pub id: u16,
    pub errors: Option<Vec<String>>,
}

impl<T> Transport<T> {
    /// Successful response carrying a payload.
    pub fn ok(data: T) -> Self {
        Self {
            status: TransportStatus {
                id: StatusCode::OK.as_u16(),
                errors: None,
            },
            data: Some(data),
        }
    }

    /// Successful response with no payload; `data` is left out of the JSON.
    pub fn empty() -> Self {
        Self {
            status: TransportStatus {
                id: StatusCode::OK.as_u16(),
                errors: None,
            },
            data: None,
        }
    }

    /// Failed response. The payload is dropped: `data` never appears next to
    /// errors in the serialized form.
    pub fn fail(id: u16, errors: Vec<String>) -> Self {
        Self {
            status: TransportStatus {
                id,
                errors: Some(errors),
            },
            data: None,
        }
    }

    /// Failed response from a single message, normalized to a one-element list.
    pub fn fail_one(id: u16, error: impl Into<String>) -> Self {
        Self::fail(id, vec![error.into()])
    }
}

impl<T: Serialize> IntoResponse for Transport<T> {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status.id)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        answer: u32,
    }

    #[test]
    fn ok_serializes_status_and_data() {
        let t = Transport::ok(Payload { answer: 42 });
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["status"]["id"], 200);
        assert!(json["status"]["errors"].is_null());
        assert_eq!(json["data"]["answer"], 42);
    }

    #[test]
    fn empty_omits_data_without_errors() {
        let t = Transport::<Payload>::empty();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["status"]["id"], 200);
        assert!(json["status"]["errors"].is_null());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn fail_omits_data_entirely() {
        let t = Transport::<Payload>::fail(409, vec!["already attached".into()]);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["status"]["id"], 409);
        assert_eq!(json["status"]["errors"][0], "already attached");
        // data must not be present at all, not even as null
        assert!(json.get("data").is_none());
        let text = serde_json::to_string(&t).unwrap();
        assert!(!text.contains("\"data\""));
    }

    #[test]
    fn fail_one_wraps_single_message_into_list() {
        let t = Transport::<Payload>::fail_one(404, "no such circle");
        let json = serde_json::to_value(&t).unwrap();
        let errors = json["status"]["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "no such circle");
    }
}
