use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// How the account was established. Federated accounts have no password
/// hash and arrive with a verified email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Local,
    Federated,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,       // internal row id, never leaves the API
    pub external_id: Uuid, // public identifier and JWT subject
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // Argon2 hash, NULL for federated accounts
    pub first_name: String,
    pub last_name: String,
    pub photo_path: Option<String>,
    pub date_of_birth: Option<Date>,
    pub account_type: AccountType,
    #[serde(skip_serializing)]
    pub verification_hash: Option<String>,
    pub verification_expires_on: Option<OffsetDateTime>,
    pub email_verified_on: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub reset_hash: Option<String>,
    pub reset_expires_on: Option<OffsetDateTime>,
    pub created_on: OffsetDateTime,
}

pub struct NewLocalUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub verification_hash: String,
    pub verification_expires_on: OffsetDateTime,
}

pub struct NewFederatedUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_path: Option<String>,
}
