use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseCategory {
    pub id: i64,
    pub circle_id: i64,
    pub name: String,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

/// Bill row joined with its (optional) category name for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseBill {
    pub id: i64,
    pub circle_id: i64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub amount_cents: i64,
    pub description: String,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

/// Unique on `(circle_id, name)`; a false second element means the name
/// was already taken.
pub async fn add_category(
    db: &PgPool,
    circle_id: i64,
    name: &str,
    created_by: i64,
) -> anyhow::Result<Option<ExpenseCategory>> {
    let row = sqlx::query_as::<_, ExpenseCategory>(
        r#"
        INSERT INTO expense_categories (circle_id, name, created_by)
        VALUES ($1, $2, $3)
        ON CONFLICT (circle_id, name) DO NOTHING
        RETURNING id, circle_id, name, created_by, created_on
        "#,
    )
    .bind(circle_id)
    .bind(name)
    .bind(created_by)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list_categories(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<ExpenseCategory>> {
    let rows = sqlx::query_as::<_, ExpenseCategory>(
        r#"
        SELECT id, circle_id, name, created_by, created_on
        FROM expense_categories
        WHERE circle_id = $1
        ORDER BY name
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_category(
    db: &PgPool,
    category_id: i64,
) -> anyhow::Result<Option<ExpenseCategory>> {
    let row = sqlx::query_as::<_, ExpenseCategory>(
        r#"
        SELECT id, circle_id, name, created_by, created_on
        FROM expense_categories
        WHERE id = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn add_bill(
    db: &PgPool,
    circle_id: i64,
    category_id: Option<i64>,
    amount_cents: i64,
    description: &str,
    created_by: i64,
) -> anyhow::Result<ExpenseBill> {
    let bill = sqlx::query_as::<_, ExpenseBill>(
        r#"
        WITH inserted AS (
            INSERT INTO expense_bills (circle_id, category_id, amount_cents, description, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, circle_id, category_id, amount_cents, description, created_by, created_on
        )
        SELECT i.id, i.circle_id, i.category_id, c.name AS category_name,
               i.amount_cents, i.description, i.created_by, i.created_on
        FROM inserted i
        LEFT JOIN expense_categories c ON c.id = i.category_id
        "#,
    )
    .bind(circle_id)
    .bind(category_id)
    .bind(amount_cents)
    .bind(description)
    .bind(created_by)
    .fetch_one(db)
    .await?;
    Ok(bill)
}

pub async fn list_bills(db: &PgPool, circle_id: i64) -> anyhow::Result<Vec<ExpenseBill>> {
    let rows = sqlx::query_as::<_, ExpenseBill>(
        r#"
        SELECT b.id, b.circle_id, b.category_id, c.name AS category_name,
               b.amount_cents, b.description, b.created_by, b.created_on
        FROM expense_bills b
        LEFT JOIN expense_categories c ON c.id = b.category_id
        WHERE b.circle_id = $1 AND b.removed_on IS NULL
        ORDER BY b.created_on DESC
        "#,
    )
    .bind(circle_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_bill(db: &PgPool, bill_id: i64) -> anyhow::Result<Option<ExpenseBill>> {
    let row = sqlx::query_as::<_, ExpenseBill>(
        r#"
        SELECT b.id, b.circle_id, b.category_id, c.name AS category_name,
               b.amount_cents, b.description, b.created_by, b.created_on
        FROM expense_bills b
        LEFT JOIN expense_categories c ON c.id = b.category_id
        WHERE b.id = $1 AND b.removed_on IS NULL
        "#,
    )
    .bind(bill_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn remove_bill(
    db: &PgPool,
    bill_id: i64,
    circle_id: i64,
    removed_by: i64,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE expense_bills SET removed_on = now(), removed_by = $3
        WHERE id = $1 AND circle_id = $2 AND removed_on IS NULL
        "#,
    )
    .bind(bill_id)
    .bind(circle_id)
    .bind(removed_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
