use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::auth::repo_types::{AccountType, User};

time::serde::format_description!(birth_date, Date, "[year]-[month]-[day]");

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, with = "birth_date::option")]
    pub date_of_birth: Option<Date>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for federated login; `token` is the provider's bearer token.
#[derive(Debug, Deserialize)]
pub struct FederatedLoginRequest {
    pub token: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub hash: String,
}

/// `baseUrl` lets a client front-end receive the reset link on its own
/// origin; absent, the configured application base URL is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordResetRequest {
    pub email: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub hash: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Patch-style profile update; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, with = "birth_date::option")]
    pub date_of_birth: Option<Date>,
}

/// Response returned after register, login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to clients. `id` is the external id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_path: Option<String>,
    #[serde(with = "birth_date::option")]
    pub date_of_birth: Option<Date>,
    pub account_type: AccountType,
    pub email_verified: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.external_id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            photo_path: user.photo_path.clone(),
            date_of_birth: user.date_of_birth,
            account_type: user.account_type,
            email_verified: user.email_verified_on.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn register_request_parses_camel_case_and_date() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{
                "email": "ana@example.com",
                "password": "hunter2hunter2",
                "firstName": "Ana",
                "lastName": "Llop",
                "dateOfBirth": "1990-04-23"
            }"#,
        )
        .expect("valid body");
        assert_eq!(req.first_name, "Ana");
        assert_eq!(req.date_of_birth, Some(date!(1990 - 04 - 23)));
    }

    #[test]
    fn register_request_allows_missing_birth_date() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.c","password":"longenough","firstName":"A","lastName":"B"}"#,
        )
        .expect("valid body");
        assert!(req.date_of_birth.is_none());
    }

    #[test]
    fn public_user_serializes_camel_case() {
        let user = PublicUser {
            id: Uuid::nil(),
            email: "ana@example.com".into(),
            first_name: "Ana".into(),
            last_name: "Llop".into(),
            photo_path: None,
            date_of_birth: Some(date!(1990 - 04 - 23)),
            account_type: AccountType::Local,
            email_verified: true,
        };
        let json = serde_json::to_value(&user).expect("serialize");
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["dateOfBirth"], "1990-04-23");
        assert_eq!(json["accountType"], "local");
        assert_eq!(json["emailVerified"], true);
    }
}
