use axum::extract::FromRef;
use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use serde_json::json;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::dto::{
    AuthResponse, ChangePasswordRequest, FederatedLoginRequest, LoginRequest, PublicUser,
    RefreshRequest, RegisterRequest, RequestPasswordResetRequest, UpdateProfileRequest,
};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, password_problems, verify_password};
use crate::auth::repo_types::{NewFederatedUser, NewLocalUser, User};
use crate::circles::repo::CircleMember;
use crate::error::ApiError;
use crate::mail;
use crate::state::AppState;
use crate::uploads;

const VERIFICATION_TTL_HOURS: i64 = 24;
const RESET_TTL_HOURS: i64 = 1;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Opaque single-use token for email verification and password reset links.
fn new_link_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

fn issue_tokens(keys: &JwtKeys, user: &User) -> Result<AuthResponse, ApiError> {
    let access_token = keys.sign_access(user.external_id).map_err(ApiError::internal)?;
    let refresh_token = keys
        .sign_refresh(user.external_id)
        .map_err(ApiError::internal)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

/// The registration itself never waits on (or fails with) the verification
/// mail; a failed send is only logged.
fn send_verification_mail_detached(state: &AppState, user: &User, hash: &str) {
    let mailer = state.mailer.clone();
    let to = user.email.clone();
    let values = mail::values(json!({
        "firstName": user.first_name,
        "link": mail::link_to(&state.config.app_base_url, &format!("verifyEmail?hash={hash}")),
    }));
    tokio::spawn(async move {
        let text = mail::render(mail::VERIFY_TEXT, &values);
        let html = mail::render(mail::VERIFY_HTML, &values);
        if let Err(error) = mailer.send(&to, mail::VERIFY_SUBJECT, &text, &html).await {
            warn!(error = %error, to = %to, "verification mail failed");
        }
    });
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&req.email);

    let mut problems = Vec::new();
    if !is_valid_email(&email) {
        problems.push("email address is not valid".to_string());
    }
    problems.extend(password_problems(&req.password));
    if req.first_name.trim().is_empty() {
        problems.push("first name must not be blank".to_string());
    }
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    if User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        return Err(ApiError::conflict("email is already registered"));
    }

    let verification_hash = new_link_token();
    let new = NewLocalUser {
        email,
        password_hash: hash_password(&req.password).map_err(ApiError::internal)?,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        date_of_birth: req.date_of_birth,
        verification_hash: verification_hash.clone(),
        verification_expires_on: OffsetDateTime::now_utc()
            + TimeDuration::hours(VERIFICATION_TTL_HOURS),
    };
    let user = User::create_local(&state.db, &new)
        .await
        .map_err(ApiError::internal)?;

    // invitations sent to this address before the account existed become
    // regular pending memberships now
    let claimed = CircleMember::claim_invites(&state.db, &user.email, user.id)
        .await
        .map_err(ApiError::internal)?;
    if claimed > 0 {
        info!(user = %user.external_id, count = claimed, "pending invites attached on register");
    }

    send_verification_mail_detached(state, &user, &verification_hash);

    let keys = JwtKeys::from_ref(state);
    issue_tokens(&keys, &user)
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<AuthResponse, ApiError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email address is not valid"));
    }

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    // federated accounts carry no hash and cannot password-login
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;
    if !verify_password(&req.password, hash).map_err(ApiError::internal)? {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(state);
    issue_tokens(&keys, &user)
}

/// Login with a third-party identity token. First sight of a verified
/// profile creates the account on the spot.
pub async fn login_federated(
    state: &AppState,
    req: FederatedLoginRequest,
) -> Result<AuthResponse, ApiError> {
    let profile = match state.identity.verify(&req.token).await {
        Ok(p) => p,
        Err(error) => {
            warn!(error = %error, "federated token rejected");
            return Err(ApiError::unauthorized("identity token rejected"));
        }
    };

    let email = normalize_email(&profile.email);
    let keys = JwtKeys::from_ref(state);

    if let Some(user) = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
    {
        return issue_tokens(&keys, &user);
    }

    let new = NewFederatedUser {
        email,
        first_name: profile.given_name.unwrap_or_default(),
        last_name: profile.family_name.unwrap_or_default(),
        photo_path: profile.picture_url,
    };
    let user = User::create_federated(&state.db, &new)
        .await
        .map_err(ApiError::internal)?;

    let claimed = CircleMember::claim_invites(&state.db, &user.email, user.id)
        .await
        .map_err(ApiError::internal)?;
    if claimed > 0 {
        info!(user = %user.external_id, count = claimed, "pending invites attached on federated login");
    }

    issue_tokens(&keys, &user)
}

pub async fn refresh(state: &AppState, req: RefreshRequest) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys
        .verify_refresh(&req.refresh_token)
        .map_err(|_| ApiError::unauthorized("invalid refresh token"))?;

    let user = User::find_by_external(&state.db, claims.sub)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    issue_tokens(&keys, &user)
}

pub async fn verify_email(state: &AppState, hash: &str) -> Result<(), ApiError> {
    if User::mark_email_verified(&state.db, hash)
        .await
        .map_err(ApiError::internal)?
    {
        Ok(())
    } else {
        Err(ApiError::not_found("verification link is invalid or expired"))
    }
}

pub async fn request_password_reset(
    state: &AppState,
    req: RequestPasswordResetRequest,
) -> Result<(), ApiError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email address is not valid"));
    }

    let user = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("no account with this email address"))?;

    let hash = new_link_token();
    let expires_on = OffsetDateTime::now_utc() + TimeDuration::hours(RESET_TTL_HOURS);
    if !User::store_reset_request(&state.db, user.id, &hash, expires_on)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::internal(anyhow::anyhow!(
            "reset request not persisted"
        )));
    }

    let base_url = req
        .base_url
        .as_deref()
        .unwrap_or(&state.config.app_base_url);
    let values = mail::values(json!({
        "firstName": user.first_name,
        "link": mail::link_to(base_url, &format!("resetPassword?hash={hash}")),
    }));
    let text = mail::render(mail::RESET_TEXT, &values);
    let html = mail::render(mail::RESET_HTML, &values);
    state
        .mailer
        .send(&user.email, mail::RESET_SUBJECT, &text, &html)
        .await
        .map_err(ApiError::internal)?;

    Ok(())
}

pub async fn reset_password(state: &AppState, hash: &str, password: &str) -> Result<(), ApiError> {
    let problems = password_problems(password);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let password_hash = hash_password(password).map_err(ApiError::internal)?;
    if User::redeem_reset(&state.db, hash, &password_hash)
        .await
        .map_err(ApiError::internal)?
    {
        Ok(())
    } else {
        Err(ApiError::not_found("reset link is invalid or expired"))
    }
}

pub async fn change_password(
    state: &AppState,
    user: &User,
    req: ChangePasswordRequest,
) -> Result<(), ApiError> {
    let problems = password_problems(&req.new_password);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("password login is not enabled for this account"))?;
    if !verify_password(&req.old_password, hash).map_err(ApiError::internal)? {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let new_hash = hash_password(&req.new_password).map_err(ApiError::internal)?;
    if !User::set_password(&state.db, user.id, &new_hash)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::not_found("user not found"));
    }
    Ok(())
}

pub async fn update_profile(
    state: &AppState,
    user_id: i64,
    req: UpdateProfileRequest,
) -> Result<PublicUser, ApiError> {
    let user = User::update_profile(
        &state.db,
        user_id,
        req.first_name.as_deref(),
        req.last_name.as_deref(),
        req.date_of_birth,
    )
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(PublicUser::from(&user))
}

/// Store a new profile photo. The previous object is dropped best effort,
/// and only once the row points at the new one.
pub async fn upload_photo(
    state: &AppState,
    user: &User,
    body: bytes::Bytes,
) -> Result<String, ApiError> {
    let key = uploads::store_jpeg(state.storage.as_ref(), "users", body).await?;

    if !User::set_photo_path(&state.db, user.id, &key)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::not_found("user not found"));
    }

    if let Some(old) = &user.photo_path {
        if let Err(error) = state.storage.remove(old).await {
            warn!(error = %error, path = %old, "stale profile photo not deleted");
        }
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plausible_addresses() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn email_regex_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn link_tokens_are_long_and_urlsafe() {
        let token = new_link_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, new_link_token());
    }
}
