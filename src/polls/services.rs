use std::collections::HashMap;

use tracing::info;

use crate::auth::repo_types::User;
use crate::circles::authz;
use crate::circles::services::{require_admin, require_member};
use crate::error::ApiError;
use crate::polls::dto::{
    CreatePollRequest, PollAnswerResponse, PollResponse, RemovePollRequest, VoteRequest,
};
use crate::polls::repo;
use crate::state::AppState;

/// Question and answers are created in one transaction; a poll with fewer
/// than two answers never exists, not even briefly.
pub async fn create(
    state: &AppState,
    user: &User,
    req: CreatePollRequest,
) -> Result<PollResponse, ApiError> {
    require_member(state, user.id, req.circle_id).await?;

    let question = req.question.trim();
    let answers: Vec<&str> = req.answers.iter().map(|a| a.trim()).collect();

    let mut problems = Vec::new();
    if question.is_empty() {
        problems.push("question must not be blank".to_string());
    }
    if answers.len() < 2 {
        problems.push("a poll needs at least two answers".to_string());
    }
    if answers.iter().any(|a| a.is_empty()) {
        problems.push("answers must not be blank".to_string());
    }
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let mut tx = state.db.begin().await.map_err(ApiError::internal)?;
    let created = repo::create_question(&mut tx, req.circle_id, question, user.id)
        .await
        .map_err(ApiError::internal)?;
    let mut created_answers = Vec::with_capacity(answers.len());
    for answer in &answers {
        let row = repo::create_answer(&mut tx, created.id, answer)
            .await
            .map_err(ApiError::internal)?;
        created_answers.push(PollAnswerResponse {
            id: row.id,
            answer: row.answer,
            votes: 0,
        });
    }
    tx.commit().await.map_err(ApiError::internal)?;

    info!(poll = created.id, circle = created.circle_id, "poll created");
    Ok(PollResponse {
        id: created.id,
        question: created.question,
        created_on: created.created_on,
        answers: created_answers,
    })
}

pub async fn by_circle(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<PollResponse>, ApiError> {
    require_member(state, user.id, circle_id).await?;

    let questions = repo::list_questions(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    let answers = repo::list_answers_with_votes(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;

    let mut grouped: HashMap<i64, Vec<PollAnswerResponse>> = HashMap::new();
    for answer in answers {
        grouped
            .entry(answer.question_id)
            .or_default()
            .push(PollAnswerResponse {
                id: answer.id,
                answer: answer.answer,
                votes: answer.votes,
            });
    }

    Ok(questions
        .into_iter()
        .map(|q| PollResponse {
            answers: grouped.remove(&q.id).unwrap_or_default(),
            id: q.id,
            question: q.question,
            created_on: q.created_on,
        })
        .collect())
}

/// Record or switch the caller's vote. The answer must belong to the
/// question it is cast for.
pub async fn vote(state: &AppState, user: &User, req: VoteRequest) -> Result<(), ApiError> {
    let question = repo::find_question(&state.db, req.question_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("poll not found"))?;
    require_member(state, user.id, question.circle_id).await?;

    let answer = repo::find_answer(&state.db, req.answer_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("answer not found"))?;
    if answer.question_id != question.id {
        return Err(ApiError::not_found("answer does not belong to this poll"));
    }

    repo::upsert_vote(&state.db, question.id, answer.id, user.id)
        .await
        .map_err(ApiError::internal)
}

/// Soft-remove a question; the creator may always remove their own poll,
/// anyone else needs admin standing.
pub async fn remove(
    state: &AppState,
    user: &User,
    req: RemovePollRequest,
) -> Result<bool, ApiError> {
    let question = repo::find_question(&state.db, req.question_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("poll not found"))?;

    if authz::removal_needs_admin(question.created_by, user.id) {
        require_admin(state, user.id, question.circle_id).await?;
    } else {
        require_member(state, user.id, question.circle_id).await?;
    }

    repo::remove_question(&state.db, question.id, user.id)
        .await
        .map_err(ApiError::internal)
}
