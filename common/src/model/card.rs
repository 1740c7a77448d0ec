use crate::model::design::CardConfig;
use serde::{Deserialize, Serialize};

/// A single card persisted through the save flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCard {
    pub id: String,
    pub owner: String,
    pub config: CardConfig,
    /// Durable reference to the rendered image, if one was uploaded.
    pub image_url: Option<String>,
    pub updated_at: String,
}
