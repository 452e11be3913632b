use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::retention::DISPLAY_RETENTION_DAYS;

#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: i64,
    pub circle_id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub due_on: Option<OffsetDateTime>,
    pub completed_on: Option<OffsetDateTime>,
    pub completed_by: Option<i64>,
    pub removed_on: Option<OffsetDateTime>,
    pub removed_by: Option<i64>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

const TODO_COLUMNS: &str = "id, circle_id, title, notes, due_on, completed_on, completed_by, \
     removed_on, removed_by, created_by, created_on";

pub async fn create(
    db: &PgPool,
    circle_id: i64,
    title: &str,
    notes: Option<&str>,
    due_on: Option<OffsetDateTime>,
    created_by: i64,
) -> anyhow::Result<Todo> {
    let sql = format!(
        r#"
        INSERT INTO todos (circle_id, title, notes, due_on, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {TODO_COLUMNS}
        "#
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(circle_id)
        .bind(title)
        .bind(notes)
        .bind(due_on)
        .bind(created_by)
        .fetch_one(db)
        .await?;
    Ok(todo)
}

/// Open items plus completed/removed ones still inside the display
/// retention window.
pub async fn list_for_circle(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<Todo>> {
    let sql = format!(
        r#"
        SELECT {TODO_COLUMNS}
        FROM todos
        WHERE circle_id = $1
          AND (completed_on IS NULL OR completed_on > now() - $2 * interval '1 day')
          AND (removed_on IS NULL OR removed_on > now() - $2 * interval '1 day')
        ORDER BY created_on DESC
        "#
    );
    let rows = sqlx::query_as::<_, Todo>(&sql)
        .bind(circle_id)
        .bind(DISPLAY_RETENTION_DAYS)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Patch-style update; absent fields keep their value. Removed items stay
/// frozen.
pub async fn update(
    db: &PgPool,
    id: i64,
    circle_id: i64,
    title: Option<&str>,
    notes: Option<&str>,
    due_on: Option<OffsetDateTime>,
) -> anyhow::Result<Option<Todo>> {
    let sql = format!(
        r#"
        UPDATE todos
        SET title = COALESCE($3, title),
            notes = COALESCE($4, notes),
            due_on = COALESCE($5, due_on)
        WHERE id = $1 AND circle_id = $2 AND removed_on IS NULL
        RETURNING {TODO_COLUMNS}
        "#
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(id)
        .bind(circle_id)
        .bind(title)
        .bind(notes)
        .bind(due_on)
        .fetch_optional(db)
        .await?;
    Ok(todo)
}

pub async fn complete(
    db: &PgPool,
    id: i64,
    circle_id: i64,
    completed_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE todos SET completed_on = now(), completed_by = $3
        WHERE id = $1 AND circle_id = $2
          AND completed_on IS NULL AND removed_on IS NULL
        "#,
    )
    .bind(id)
    .bind(circle_id)
    .bind(completed_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove(
    db: &PgPool,
    id: i64,
    circle_id: i64,
    removed_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE todos SET removed_on = now(), removed_by = $3
        WHERE id = $1 AND circle_id = $2 AND removed_on IS NULL
        "#,
    )
    .bind(id)
    .bind(circle_id)
    .bind(removed_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
