use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::OffsetDateTime;

use crate::plugins::repo::{AttachedPlugin, Plugin};

#[derive(Debug, Serialize)]
pub struct PluginResponse {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

impl From<&Plugin> for PluginResponse {
    fn from(plugin: &Plugin) -> Self {
        Self {
            id: plugin.id,
            name: plugin.name.clone(),
            price: plugin.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedPluginResponse {
    pub id: i64,
    pub name: String,
    pub price: i64,
    #[serde(with = "rfc3339")]
    pub added_on: OffsetDateTime,
}

impl From<&AttachedPlugin> for AttachedPluginResponse {
    fn from(row: &AttachedPlugin) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            price: row.price,
            added_on: row.added_on,
        }
    }
}

/// `id` names the plugin, matching the public API's original shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachPluginRequest {
    pub id: i64,
    pub circle_id: i64,
}
