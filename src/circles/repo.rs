use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Circle {
    pub id: i64,
    pub name: String,
    pub image_path: Option<String>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
    pub deactivated_on: Option<OffsetDateTime>,
}

/// Membership row. `user_id` stays NULL until the invitee has an account;
/// `joined_on` NULL means the invitation is still pending; `left_on` set
/// means the membership ended.
#[derive(Debug, Clone, FromRow)]
pub struct CircleMember {
    pub id: i64,
    pub circle_id: i64,
    pub user_id: Option<i64>,
    pub invitee_email: String,
    pub joined_on: Option<OffsetDateTime>,
    pub left_on: Option<OffsetDateTime>,
    pub admin_on: Option<OffsetDateTime>,
    pub created_by: i64,
    pub created_on: OffsetDateTime,
}

/// One row of the per-user circle listing, membership flags included.
#[derive(Debug, Clone, FromRow)]
pub struct CircleForUser {
    pub id: i64,
    pub name: String,
    pub image_path: Option<String>,
    pub is_owner: bool,
    pub is_admin: bool,
    pub joined_on: Option<OffsetDateTime>,
}

impl Circle {
    /// Conditional insert enforcing the owned-circles quota in the same
    /// statement; `None` means the quota is already used up.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        owner_id: i64,
        max_owned: i64,
    ) -> anyhow::Result<Option<Circle>> {
        // Creators for one owner queue on the owner's row; without the lock
        // two concurrent inserts read the same count and both pass.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(owner_id)
            .execute(&mut **tx)
            .await?;

        let circle = sqlx::query_as::<_, Circle>(
            r#"
            INSERT INTO circles (name, created_by)
            SELECT $1, $2
            WHERE (
                SELECT COUNT(*) FROM circles
                WHERE created_by = $2 AND deactivated_on IS NULL
            ) < $3
            RETURNING id, name, image_path, created_by, created_on, deactivated_on
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .bind(max_owned)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(circle)
    }

    /// Lookup regardless of deactivation; deactivate() needs to see the
    /// row to stay idempotent.
    pub async fn find(db: &PgPool, circle_id: i64) -> anyhow::Result<Option<Circle>> {
        let circle = sqlx::query_as::<_, Circle>(
            r#"
            SELECT id, name, image_path, created_by, created_on, deactivated_on
            FROM circles
            WHERE id = $1
            "#,
        )
        .bind(circle_id)
        .fetch_optional(db)
        .await?;
        Ok(circle)
    }

    pub async fn deactivate(db: &PgPool, circle_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE circles SET deactivated_on = now() WHERE id = $1 AND deactivated_on IS NULL",
        )
        .bind(circle_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_image_path(db: &PgPool, circle_id: i64, path: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE circles SET image_path = $2 WHERE id = $1 AND deactivated_on IS NULL",
        )
        .bind(circle_id)
        .bind(path)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl CircleForUser {
    /// Active memberships (pending included) in non-deactivated circles.
    pub async fn list_for_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<CircleForUser>> {
        let rows = sqlx::query_as::<_, CircleForUser>(
            r#"
            SELECT c.id, c.name, c.image_path,
                   (c.created_by = cm.user_id) AS is_owner,
                   (cm.admin_on IS NOT NULL) AS is_admin,
                   cm.joined_on
            FROM circle_members cm
            JOIN circles c ON c.id = cm.circle_id
            WHERE cm.user_id = $1
              AND cm.left_on IS NULL
              AND c.deactivated_on IS NULL
            ORDER BY c.created_on
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl CircleMember {
    /// The owner's own membership row, written in the creation transaction.
    /// Owners count as confirmed members and admins from the start.
    pub async fn create_owner(
        tx: &mut Transaction<'_, Postgres>,
        circle_id: i64,
        owner_id: i64,
        owner_email: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO circle_members
                (circle_id, user_id, invitee_email, joined_on, admin_on, created_by)
            VALUES ($1, $2, $3, now(), now(), $2)
            "#,
        )
        .bind(circle_id)
        .bind(owner_id)
        .bind(owner_email)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Pending invitation row. `user_id` is filled when the invitee already
    /// has an account, otherwise claimed later by `claim_invites`. The
    /// partial unique indexes allow at most one active row per person and
    /// circle; `None` means such a row already exists and nothing was
    /// inserted.
    pub async fn invite(
        db: &PgPool,
        circle_id: i64,
        user_id: Option<i64>,
        invitee_email: &str,
        created_by: i64,
    ) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO circle_members (circle_id, user_id, invitee_email, created_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            RETURNING id
            "#,
        )
        .bind(circle_id)
        .bind(user_id)
        .bind(invitee_email)
        .bind(created_by)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    pub async fn confirm(db: &PgPool, circle_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE circle_members SET joined_on = now()
            WHERE circle_id = $1 AND user_id = $2
              AND joined_on IS NULL AND left_on IS NULL
            "#,
        )
        .bind(circle_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn leave(db: &PgPool, circle_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE circle_members SET left_on = now()
            WHERE circle_id = $1 AND user_id = $2 AND left_on IS NULL
            "#,
        )
        .bind(circle_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach invitations that predate the invitee's account. Called from
    /// both registration paths once the user row exists.
    pub async fn claim_invites(db: &PgPool, email: &str, user_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE circle_members SET user_id = $2
            WHERE invitee_email = $1 AND user_id IS NULL
              AND joined_on IS NULL AND left_on IS NULL
            "#,
        )
        .bind(email)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}
