use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: i64,
    pub circle_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: OffsetDateTime,
    pub location: Option<String>,
    pub removed_on: Option<OffsetDateTime>,
    pub removed_by: Option<i64>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventPhoto {
    pub id: i64,
    pub event_id: i64,
    pub path: String,
    pub added_by: i64,
    pub added_on: OffsetDateTime,
}

const EVENT_COLUMNS: &str = "id, circle_id, title, description, starts_at, location, \
     removed_on, removed_by, created_by, created_on";

pub async fn create(
    db: &PgPool,
    circle_id: i64,
    title: &str,
    description: Option<&str>,
    starts_at: OffsetDateTime,
    location: Option<&str>,
    created_by: i64,
) -> anyhow::Result<Event> {
    let sql = format!(
        r#"
        INSERT INTO events (circle_id, title, description, starts_at, location, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {EVENT_COLUMNS}
        "#
    );
    let event = sqlx::query_as::<_, Event>(&sql)
        .bind(circle_id)
        .bind(title)
        .bind(description)
        .bind(starts_at)
        .bind(location)
        .bind(created_by)
        .fetch_one(db)
        .await?;
    Ok(event)
}

pub async fn find(db: &PgPool, event_id: i64) -> anyhow::Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND removed_on IS NULL");
    let event = sqlx::query_as::<_, Event>(&sql)
        .bind(event_id)
        .fetch_optional(db)
        .await?;
    Ok(event)
}

pub async fn list_upcoming(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<Event>> {
    let sql = format!(
        r#"
        SELECT {EVENT_COLUMNS}
        FROM events
        WHERE circle_id = $1 AND removed_on IS NULL AND starts_at >= now()
        ORDER BY starts_at
        "#
    );
    let rows = sqlx::query_as::<_, Event>(&sql)
        .bind(circle_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Join is an upsert on `(event_id, user_id)`; false means the caller was
/// already in.
pub async fn join(db: &PgPool, event_id: i64, user_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO event_members (event_id, user_id, joined_on)
        VALUES ($1, $2, now())
        ON CONFLICT (event_id, user_id)
        DO UPDATE SET joined_on = now(), left_on = NULL
        WHERE event_members.left_on IS NOT NULL
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn leave(db: &PgPool, event_id: i64, user_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE event_members SET left_on = now()
        WHERE event_id = $1 AND user_id = $2 AND left_on IS NULL
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn add_photo(
    db: &PgPool,
    event_id: i64,
    path: &str,
    added_by: i64,
) -> anyhow::Result<EventPhoto> {
    let photo = sqlx::query_as::<_, EventPhoto>(
        r#"
        INSERT INTO event_photos (event_id, path, added_by)
        VALUES ($1, $2, $3)
        RETURNING id, event_id, path, added_by, added_on
        "#,
    )
    .bind(event_id)
    .bind(path)
    .bind(added_by)
    .fetch_one(db)
    .await?;
    Ok(photo)
}

pub async fn list_photos(db: &PgPool, event_id: i64) -> anyhow::Result<Vec<EventPhoto>> {
    let rows = sqlx::query_as::<_, EventPhoto>(
        r#"
        SELECT id, event_id, path, added_by, added_on
        FROM event_photos
        WHERE event_id = $1
        ORDER BY added_on
        "#,
    )
    .bind(event_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
