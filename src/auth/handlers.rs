use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    response::Redirect,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::dto::{
    AuthResponse, ChangePasswordRequest, FederatedLoginRequest, LoginRequest, PhotoResponse,
    PublicUser, RefreshRequest, RegisterRequest, RequestPasswordResetRequest,
    ResetPasswordRequest, UpdateProfileRequest, VerifyEmailRequest,
};
use crate::auth::extractors::CurrentUser;
use crate::auth::services;
use crate::error::ApiError;
use crate::state::AppState;
use crate::transport::Transport;

const PHOTO_URL_TTL: Duration = Duration::from_secs(600);

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .route("/user/loginFederated", post(login_federated))
        .route("/user/refresh", post(refresh))
        .route("/user/verifyEmail", post(verify_email))
        .route("/user/requestPasswordReset", post(request_password_reset))
        .route("/user/resetPassword", post(reset_password))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/user/me", get(me))
        .route("/user/update", put(update_profile))
        .route("/user/changePassword", post(change_password))
        .route("/user/photo", post(upload_photo).get(photo))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Transport<AuthResponse>, ApiError> {
    let response = services::register(&state, payload).await?;
    info!(user = %response.user.id, "user registered");
    Ok(Transport::ok(response))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Transport<AuthResponse>, ApiError> {
    let response = services::login(&state, payload).await?;
    info!(user = %response.user.id, "user logged in");
    Ok(Transport::ok(response))
}

#[instrument(skip(state, payload))]
async fn login_federated(
    State(state): State<AppState>,
    Json(payload): Json<FederatedLoginRequest>,
) -> Result<Transport<AuthResponse>, ApiError> {
    let response = services::login_federated(&state, payload).await?;
    info!(user = %response.user.id, "federated login");
    Ok(Transport::ok(response))
}

#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Transport<AuthResponse>, ApiError> {
    let response = services::refresh(&state, payload).await?;
    Ok(Transport::ok(response))
}

#[instrument(skip(state, payload))]
async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Transport<()>, ApiError> {
    services::verify_email(&state, &payload.hash).await?;
    Ok(Transport::empty())
}

#[instrument(skip(state, payload))]
async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<RequestPasswordResetRequest>,
) -> Result<Transport<()>, ApiError> {
    services::request_password_reset(&state, payload).await?;
    Ok(Transport::empty())
}

#[instrument(skip(state, payload))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Transport<()>, ApiError> {
    services::reset_password(&state, &payload.hash, &payload.password).await?;
    Ok(Transport::empty())
}

#[instrument(skip(current))]
async fn me(current: CurrentUser) -> Transport<PublicUser> {
    Transport::ok(PublicUser::from(&current.0))
}

#[instrument(skip(state, current, payload))]
async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Transport<PublicUser>, ApiError> {
    let user = services::update_profile(&state, current.0.id, payload).await?;
    Ok(Transport::ok(user))
}

#[instrument(skip(state, current, payload))]
async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Transport<()>, ApiError> {
    services::change_password(&state, &current.0, payload).await?;
    info!(user = %current.0.external_id, "password changed");
    Ok(Transport::empty())
}

/// Pull the `image` file field out of the multipart body; any other
/// fields are ignored.
async fn image_field(mut multipart: Multipart) -> Result<bytes::Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("multipart body expected"))?
    {
        if field.name() == Some("image") {
            return field
                .bytes()
                .await
                .map_err(|_| ApiError::validation("image could not be read"));
        }
    }
    Err(ApiError::validation("image field missing"))
}

#[instrument(skip(state, current, multipart))]
async fn upload_photo(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<Transport<PhotoResponse>, ApiError> {
    let data = image_field(multipart).await?;
    let path = services::upload_photo(&state, &current.0, data).await?;
    Ok(Transport::ok(PhotoResponse { path }))
}

/// Redirect to a short-lived presigned URL for the caller's profile photo.
#[instrument(skip(state, current))]
async fn photo(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Redirect, ApiError> {
    let path = current
        .0
        .photo_path
        .as_deref()
        .ok_or_else(|| ApiError::not_found("no profile photo"))?;
    let url = state
        .storage
        .presigned_url(path, PHOTO_URL_TTL)
        .await
        .map_err(ApiError::internal)?;
    Ok(Redirect::temporary(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "test-boundary";

    fn part(name: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{content}\r\n"
        )
    }

    async fn multipart_from(body: String) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/user/photo")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        Multipart::from_request(request, &())
            .await
            .expect("multipart body")
    }

    #[tokio::test]
    async fn photo_upload_picks_the_image_field_by_name() {
        let body = format!(
            "{}{}--{BOUNDARY}--\r\n",
            part("note", "ignore me"),
            part("image", "jpeg-bytes")
        );
        let data = image_field(multipart_from(body).await)
            .await
            .expect("image field");
        assert_eq!(&data[..], b"jpeg-bytes");
    }

    #[tokio::test]
    async fn photo_upload_without_an_image_field_is_rejected() {
        let body = format!("{}--{BOUNDARY}--\r\n", part("note", "not an image"));
        let err = image_field(multipart_from(body).await).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
