use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct LocationPoint {
    pub id: i64,
    pub circle_id: i64,
    pub user_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_on: OffsetDateTime,
}

/// Latest position per member, joined with the member's public identity.
#[derive(Debug, Clone, FromRow)]
pub struct MemberLocation {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_on: OffsetDateTime,
}

pub async fn record(
    db: &PgPool,
    circle_id: i64,
    user_id: i64,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<LocationPoint> {
    let point = sqlx::query_as::<_, LocationPoint>(
        r#"
        INSERT INTO locations (circle_id, user_id, latitude, longitude)
        VALUES ($1, $2, $3, $4)
        RETURNING id, circle_id, user_id, latitude, longitude, recorded_on
        "#,
    )
    .bind(circle_id)
    .bind(user_id)
    .bind(latitude)
    .bind(longitude)
    .fetch_one(db)
    .await?;
    Ok(point)
}

/// One row per member who has ever reported a position in the circle,
/// keeping only the most recent point each.
pub async fn latest_per_member(
    db: &PgPool,
    circle_id: i64,
) -> anyhow::Result<Vec<MemberLocation>> {
    let rows = sqlx::query_as::<_, MemberLocation>(
        r#"
        SELECT DISTINCT ON (l.user_id)
               u.external_id AS user_id, u.first_name, u.last_name,
               l.latitude, l.longitude, l.recorded_on
        FROM locations l
        JOIN users u ON u.id = l.user_id
        WHERE l.circle_id = $1
        ORDER BY l.user_id, l.recorded_on DESC
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
