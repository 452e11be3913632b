use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Catalog entry. Price is in cents; `active` rows are the only ones
/// offered for attachment.
#[derive(Debug, Clone, FromRow)]
pub struct Plugin {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub active: bool,
}

/// Catalog entry joined with its attachment to one circle.
#[derive(Debug, Clone, FromRow)]
pub struct AttachedPlugin {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub added_on: OffsetDateTime,
}

pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<Plugin>> {
    let rows = sqlx::query_as::<_, Plugin>(
        r#"
        SELECT id, name, price, active
        FROM plugins
        WHERE active
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_active(db: &PgPool, plugin_id: i64) -> anyhow::Result<Option<Plugin>> {
    let plugin = sqlx::query_as::<_, Plugin>(
        r#"
        SELECT id, name, price, active
        FROM plugins
        WHERE id = $1 AND active
        "#,
    )
    .bind(plugin_id)
    .fetch_optional(db)
    .await?;
    Ok(plugin)
}

pub async fn list_for_circle(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<AttachedPlugin>> {
    let rows = sqlx::query_as::<_, AttachedPlugin>(
        r#"
        SELECT p.id, p.name, p.price, pc.added_on
        FROM plugin_circles pc
        JOIN plugins p ON p.id = pc.plugin_id
        WHERE pc.circle_id = $1
        ORDER BY pc.added_on
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Attach under the `(plugin_id, circle_id)` unique constraint; a false
/// return means the pair already existed.
pub async fn attach(
    db: &PgPool,
    plugin_id: i64,
    circle_id: i64,
    added_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO plugin_circles (plugin_id, circle_id, added_by)
        VALUES ($1, $2, $3)
        ON CONFLICT (plugin_id, circle_id) DO NOTHING
        "#,
    )
    .bind(plugin_id)
    .bind(circle_id)
    .bind(added_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Detach is a hard delete; re-attaching later starts clean.
pub async fn detach(db: &PgPool, plugin_id: i64, circle_id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM plugin_circles WHERE plugin_id = $1 AND circle_id = $2")
        .bind(plugin_id)
        .bind(circle_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() == 1)
}
