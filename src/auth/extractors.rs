use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::jwt::AuthUser;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user with the full row loaded. The account must still
/// exist; a valid token for a deleted account is rejected the same way as
/// a bad token.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(external_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = User::find_by_external(&state.db, external_id)
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;
        Ok(CurrentUser(user))
    }
}
