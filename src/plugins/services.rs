use tracing::info;

use crate::auth::repo_types::User;
use crate::circles::services::require_admin;
use crate::error::ApiError;
use crate::plugins::dto::{AttachedPluginResponse, PluginResponse};
use crate::plugins::repo;
use crate::state::AppState;

pub async fn catalog(state: &AppState) -> Result<Vec<PluginResponse>, ApiError> {
    let plugins = repo::list_active(&state.db)
        .await
        .map_err(ApiError::internal)?;
    if plugins.is_empty() {
        return Err(ApiError::not_found("no plugins available"));
    }
    Ok(plugins.iter().map(PluginResponse::from).collect())
}

pub async fn for_circle(
    state: &AppState,
    user: &User,
    circle_id: i64,
) -> Result<Vec<AttachedPluginResponse>, ApiError> {
    require_admin(state, user.id, circle_id).await?;
    let attached = repo::list_for_circle(&state.db, circle_id)
        .await
        .map_err(ApiError::internal)?;
    Ok(attached.iter().map(AttachedPluginResponse::from).collect())
}

/// Attach a catalog plugin to a circle. The plugin must exist and be
/// active; the unique constraint decides duplicate attachments, so two
/// concurrent attaches cannot both succeed.
pub async fn attach(
    state: &AppState,
    user: &User,
    plugin_id: i64,
    circle_id: i64,
) -> Result<(), ApiError> {
    require_admin(state, user.id, circle_id).await?;

    repo::find_active(&state.db, plugin_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("plugin not found"))?;

    if !repo::attach(&state.db, plugin_id, circle_id, user.id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::conflict("plugin already attached"));
    }
    info!(plugin = plugin_id, circle = circle_id, "plugin attached");
    Ok(())
}

pub async fn detach(
    state: &AppState,
    user: &User,
    plugin_id: i64,
    circle_id: i64,
) -> Result<(), ApiError> {
    require_admin(state, user.id, circle_id).await?;

    if !repo::detach(&state.db, plugin_id, circle_id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::conflict("plugin is not attached"));
    }
    info!(plugin = plugin_id, circle = circle_id, "plugin detached");
    Ok(())
}
