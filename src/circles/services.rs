use serde_json::json;
use tracing::{info, warn};

use crate::auth::repo_types::User;
use crate::auth::services::{is_valid_email, normalize_email};
use crate::circles::authz;
use crate::circles::dto::{
    CircleForUserResponse, CircleResponse, CreateCircleRequest, DeactivateResponse, InviteRequest,
};
use crate::circles::repo::{Circle, CircleForUser, CircleMember};
use crate::error::ApiError;
use crate::mail;
use crate::state::AppState;
use crate::uploads;

/// Free tier: an owner may hold at most this many live circles.
pub const MAX_OWNED_CIRCLES: i64 = 2;

/// Admin gate used by the plugin catalog and circle administration.
pub(crate) async fn require_admin(
    state: &AppState,
    user_id: i64,
    circle_id: i64,
) -> Result<CircleForUser, ApiError> {
    let memberships = CircleForUser::list_for_user(&state.db, user_id)
        .await
        .map_err(ApiError::internal)?;
    authz::admin_gate(&memberships, circle_id)
}

/// Member gate used by every plugin-domain data operation.
pub(crate) async fn require_member(
    state: &AppState,
    user_id: i64,
    circle_id: i64,
) -> Result<CircleForUser, ApiError> {
    let memberships = CircleForUser::list_for_user(&state.db, user_id)
        .await
        .map_err(ApiError::internal)?;
    authz::member_gate(&memberships, circle_id)
}

pub async fn circles_for_user(
    state: &AppState,
    user_id: i64,
) -> Result<Vec<CircleForUserResponse>, ApiError> {
    let rows = CircleForUser::list_for_user(&state.db, user_id)
        .await
        .map_err(ApiError::internal)?;
    if rows.is_empty() {
        return Err(ApiError::not_found("no circles for user"));
    }
    Ok(rows.iter().map(CircleForUserResponse::from).collect())
}

/// Create a circle and the owner's confirmed admin membership in one
/// transaction. Creation takes the owner's user-row lock before the
/// conditional INSERT, so concurrent creations line up and the second one
/// counts the first one's committed row.
pub async fn create_circle(
    state: &AppState,
    user: &User,
    req: CreateCircleRequest,
) -> Result<CircleResponse, ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("circle name must not be blank"));
    }

    let mut tx = state.db.begin().await.map_err(ApiError::internal)?;
    let circle = Circle::create(&mut tx, name, user.id, MAX_OWNED_CIRCLES)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::validation("circle quota reached"))?;
    CircleMember::create_owner(&mut tx, circle.id, user.id, &user.email)
        .await
        .map_err(ApiError::internal)?;
    tx.commit().await.map_err(ApiError::internal)?;

    info!(circle = circle.id, owner = %user.external_id, "circle created");
    Ok(CircleResponse::from(&circle))
}

/// Invite by email. The pending row is durable before the mail goes out;
/// a failed send fails the request but never rolls the row back. Inviting
/// someone who already holds an active row skips the insert and only
/// resends the mail, so a duplicate membership can never appear.
pub async fn invite(state: &AppState, user: &User, req: InviteRequest) -> Result<(), ApiError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(ApiError::validation("email address is not valid"));
    }

    let circle = require_admin(state, user.id, req.circle_id).await?;

    let invitee = User::find_by_email(&state.db, &email)
        .await
        .map_err(ApiError::internal)?;
    let inserted = CircleMember::invite(
        &state.db,
        circle.id,
        invitee.as_ref().map(|u| u.id),
        &email,
        user.id,
    )
    .await
    .map_err(ApiError::internal)?;
    match inserted {
        Some(_) => {
            info!(circle = circle.id, known_account = invitee.is_some(), "member invited")
        }
        None => info!(circle = circle.id, "membership already active, resending invite mail"),
    }

    let base_url = req
        .base_url
        .as_deref()
        .unwrap_or(&state.config.app_base_url);
    let values = mail::values(json!({
        "invitedBy": format!("{} {}", user.first_name, user.last_name),
        "circleName": circle.name,
        "link": mail::link_to(base_url, &format!("circle/confirm?circleId={}", circle.id)),
    }));
    let text = mail::render(mail::INVITE_TEXT, &values);
    let html = mail::render(mail::INVITE_HTML, &values);
    state
        .mailer
        .send(&email, mail::INVITE_SUBJECT, &text, &html)
        .await
        .map_err(ApiError::internal)?;

    Ok(())
}

/// Accept a pending invitation. Repeat calls return false, never an error.
pub async fn confirm(state: &AppState, user_id: i64, circle_id: i64) -> Result<bool, ApiError> {
    CircleMember::confirm(&state.db, circle_id, user_id)
        .await
        .map_err(ApiError::internal)
}

pub async fn leave(state: &AppState, user_id: i64, circle_id: i64) -> Result<bool, ApiError> {
    CircleMember::leave(&state.db, circle_id, user_id)
        .await
        .map_err(ApiError::internal)
}

/// Soft-deactivate, owner only. Checked against the circle row itself so a
/// repeat call stays an idempotent `false` even though the circle no longer
/// shows up in the owner's listing.
pub async fn deactivate(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<DeactivateResponse, ApiError> {
    let circle = Circle::find(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("circle not found"))?;
    if circle.created_by != user.id {
        warn!(circle = circle_id, "deactivate denied: not the owner");
        return Err(ApiError::unauthorized("not allowed for this circle"));
    }

    let deactivated = Circle::deactivate(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    if deactivated {
        info!(circle = circle_id, "circle deactivated");
    }
    Ok(DeactivateResponse { deactivated })
}

/// Store a new circle image, admin only. The previous object is dropped
/// best effort, and only once the row points at the new one.
pub async fn upload_image(
    state: &AppState,
    user: &User,
    circle_id: i64,
    body: bytes::Bytes,
) -> Result<String, ApiError> {
    let membership = require_admin(state, user.id, circle_id).await?;

    let path = uploads::store_jpeg(state.storage.as_ref(), "circles", body).await?;

    if !Circle::set_image_path(&state.db, circle_id, &path)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::not_found("circle not found"));
    }

    if let Some(old) = &membership.image_path {
        if let Err(error) = state.storage.remove(old).await {
            warn!(error = %error, path = %old, "stale circle image not deleted");
        }
    }
    Ok(path)
}
