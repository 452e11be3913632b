use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub circle_id: i64,
    pub question: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub question_id: i64,
    pub answer_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePollRequest {
    pub question_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PollAnswerResponse {
    pub id: i64,
    pub answer: String,
    pub votes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: i64,
    pub question: String,
    #[serde(with = "rfc3339")]
    pub created_on: OffsetDateTime,
    pub answers: Vec<PollAnswerResponse>,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}
