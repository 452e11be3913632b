use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewFederatedUser, NewLocalUser, User};

const USER_COLUMNS: &str = "id, external_id, email, password_hash, first_name, last_name, \
     photo_path, date_of_birth, account_type, verification_hash, verification_expires_on, \
     email_verified_on, reset_hash, reset_expires_on, created_on";

impl User {
    /// Find a user by (already normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Find a user by the external id carried in bearer tokens.
    pub async fn find_by_external(db: &PgPool, external_id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(external_id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// Create a password-backed account. The email stays unverified until
    /// the verification hash is redeemed.
    pub async fn create_local(db: &PgPool, new: &NewLocalUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users
                (external_id, email, password_hash, first_name, last_name,
                 date_of_birth, account_type, verification_hash, verification_expires_on)
            VALUES ($1, $2, $3, $4, $5, $6, 'local', $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.date_of_birth)
            .bind(&new.verification_hash)
            .bind(new.verification_expires_on)
            .fetch_one(db)
            .await?;
        Ok(user)
    }

    /// Create an account from a verified federated profile. No password,
    /// email counts as verified immediately.
    pub async fn create_federated(db: &PgPool, new: &NewFederatedUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users
                (external_id, email, first_name, last_name, photo_path,
                 account_type, email_verified_on)
            VALUES ($1, $2, $3, $4, $5, 'federated', now())
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.photo_path)
            .fetch_one(db)
            .await?;
        Ok(user)
    }

    /// Patch-style profile update; absent fields keep their value.
    pub async fn update_profile(
        db: &PgPool,
        id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        date_of_birth: Option<time::Date>,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                date_of_birth = COALESCE($4, date_of_birth)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(date_of_birth)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn set_photo_path(db: &PgPool, id: i64, path: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET photo_path = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Redeem an email-verification hash. Returns false when the hash is
    /// unknown, expired, or the email is already verified.
    pub async fn mark_email_verified(db: &PgPool, hash: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified_on = now(),
                verification_hash = NULL,
                verification_expires_on = NULL
            WHERE verification_hash = $1
              AND verification_expires_on > now()
              AND email_verified_on IS NULL
            "#,
        )
        .bind(hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// A new request replaces any earlier, still-open one.
    pub async fn store_reset_request(
        db: &PgPool,
        id: i64,
        hash: &str,
        expires_on: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE users SET reset_hash = $2, reset_expires_on = $3 WHERE id = $1")
                .bind(id)
                .bind(hash)
                .bind(expires_on)
                .execute(db)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Redeem a password-reset hash. Returns false when the hash is unknown
    /// or expired.
    pub async fn redeem_reset(
        db: &PgPool,
        hash: &str,
        new_password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, reset_hash = NULL, reset_expires_on = NULL
            WHERE reset_hash = $1 AND reset_expires_on > now()
            "#,
        )
        .bind(hash)
        .bind(new_password_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn set_password(db: &PgPool, id: i64, password_hash: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
