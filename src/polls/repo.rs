use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct PollQuestion {
    pub id: i64,
    pub circle_id: i64,
    pub question: String,
    pub removed_on: Option<OffsetDateTime>,
    pub removed_by: Option<i64>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct PollAnswer {
    pub id: i64,
    pub question_id: i64,
    pub answer: String,
}

/// Listing row: one answer with its vote count.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerWithVotes {
    pub id: i64,
    pub question_id: i64,
    pub answer: String,
    pub votes: i64,
}

pub async fn create_question(
    tx: &mut Transaction<'_, Postgres>,
    circle_id: i64,
    question: &str,
    created_by: i64,
) -> anyhow::Result<PollQuestion> {
    let row = sqlx::query_as::<_, PollQuestion>(
        r#"
        INSERT INTO poll_questions (circle_id, question, created_by)
        VALUES ($1, $2, $3)
        RETURNING id, circle_id, question, removed_on, removed_by, created_by, created_on
        "#,
    )
    .bind(circle_id)
    .bind(question)
    .bind(created_by)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

pub async fn create_answer(
    tx: &mut Transaction<'_, Postgres>,
    question_id: i64,
    answer: &str,
) -> anyhow::Result<PollAnswer> {
    let row = sqlx::query_as::<_, PollAnswer>(
        r#"
        INSERT INTO poll_answers (question_id, answer)
        VALUES ($1, $2)
        RETURNING id, question_id, answer
        "#,
    )
    .bind(question_id)
    .bind(answer)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

pub async fn find_question(db: &PgPool, question_id: i64) -> anyhow::Result<Option<PollQuestion>> {
    let row = sqlx::query_as::<_, PollQuestion>(
        r#"
        SELECT id, circle_id, question, removed_on, removed_by, created_by, created_on
        FROM poll_questions
        WHERE id = $1 AND removed_on IS NULL
        "#,
    )
    .bind(question_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_answer(db: &PgPool, answer_id: i64) -> anyhow::Result<Option<PollAnswer>> {
    let row = sqlx::query_as::<_, PollAnswer>(
        "SELECT id, question_id, answer FROM poll_answers WHERE id = $1",
    )
    .bind(answer_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list_questions(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<PollQuestion>> {
    let rows = sqlx::query_as::<_, PollQuestion>(
        r#"
        SELECT id, circle_id, question, removed_on, removed_by, created_by, created_on
        FROM poll_questions
        WHERE circle_id = $1 AND removed_on IS NULL
        ORDER BY created_on DESC
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Every answer of the circle's live questions with its current vote count.
pub async fn list_answers_with_votes(
    db: &PgPool,
    circle_id: i64,
) -> anyhow::Result<Vec<AnswerWithVotes>> {
    let rows = sqlx::query_as::<_, AnswerWithVotes>(
        r#"
        SELECT a.id, a.question_id, a.answer, COUNT(v.id) AS votes
        FROM poll_answers a
        JOIN poll_questions q ON q.id = a.question_id
        LEFT JOIN poll_votes v ON v.answer_id = a.id
        WHERE q.circle_id = $1 AND q.removed_on IS NULL
        GROUP BY a.id, a.question_id, a.answer
        ORDER BY a.id
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// One vote per user per question; re-voting switches the stored answer.
pub async fn upsert_vote(
    db: &PgPool,
    question_id: i64,
    answer_id: i64,
    user_id: i64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO poll_votes (question_id, answer_id, user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (question_id, user_id)
        DO UPDATE SET answer_id = EXCLUDED.answer_id, voted_on = now()
        "#,
    )
    .bind(question_id)
    .bind(answer_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn remove_question(
    db: &PgPool,
    question_id: i64,
    removed_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE poll_questions SET removed_on = now(), removed_by = $2
        WHERE id = $1 AND removed_on IS NULL
        "#,
    )
    .bind(question_id)
    .bind(removed_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
