use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::retention::DISPLAY_RETENTION_DAYS;

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingItem {
    pub id: i64,
    pub circle_id: i64,
    pub name: String,
    pub quantity: Option<String>,
    pub bought_on: Option<OffsetDateTime>,
    pub bought_by: Option<i64>,
    pub removed_on: Option<OffsetDateTime>,
    pub removed_by: Option<i64>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

const ITEM_COLUMNS: &str = "id, circle_id, name, quantity, bought_on, bought_by, removed_on, \
     removed_by, created_by, created_on";

pub async fn add(
    db: &PgPool,
    circle_id: i64,
    name: &str,
    quantity: Option<&str>,
    created_by: i64,
) -> anyhow::Result<ShoppingItem> {
    let sql = format!(
        r#"
        INSERT INTO shopping_items (circle_id, name, quantity, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING {ITEM_COLUMNS}
        "#
    );
    let item = sqlx::query_as::<_, ShoppingItem>(&sql)
        .bind(circle_id)
        .bind(name)
        .bind(quantity)
        .bind(created_by)
        .fetch_one(db)
        .await?;
    Ok(item)
}

/// Open items plus bought/removed ones still inside the display retention
/// window.
pub async fn list_for_circle(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<ShoppingItem>> {
    let sql = format!(
        r#"
        SELECT {ITEM_COLUMNS}
        FROM shopping_items
        WHERE circle_id = $1
          AND (bought_on IS NULL OR bought_on > now() - $2 * interval '1 day')
          AND (removed_on IS NULL OR removed_on > now() - $2 * interval '1 day')
        ORDER BY created_on DESC
        "#
    );
    let rows = sqlx::query_as::<_, ShoppingItem>(&sql)
        .bind(circle_id)
        .bind(DISPLAY_RETENTION_DAYS)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn mark_bought(
    db: &PgPool,
    id: i64,
    circle_id: i64,
    bought_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE shopping_items SET bought_on = now(), bought_by = $3
        WHERE id = $1 AND circle_id = $2
          AND bought_on IS NULL AND removed_on IS NULL
        "#,
    )
    .bind(id)
    .bind(circle_id)
    .bind(bought_by)
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
        UPDATE shopping_items SET removed_on = now(), removed_by = $3
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
