use crate::model::field::{Category, FieldValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Session-wide look of the cards. Colours are `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSettings {
    pub institution_name: String,
    pub category: Category,
    pub primary_color: String,
    pub secondary_color: String,
    pub text_color: String,
    pub orientation: Orientation,
    /// Photo used for records that have none of their own.
    pub base_photo: Option<String>,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            institution_name: String::new(),
            category: Category::default(),
            primary_color: "#1e3a8a".to_string(),
            secondary_color: "#ffffff".to_string(),
            text_color: "#111827".to_string(),
            orientation: Orientation::default(),
            base_photo: None,
        }
    }
}

/// Everything the render capability needs to draw one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    pub design: DesignSettings,
    pub fields: Vec<FieldValue>,
    pub photo: Option<String>,
}

impl CardConfig {
    /// Fields that should appear on the card: enabled and non-blank.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields
            .iter()
            .filter(|f| f.enabled && !f.value.trim().is_empty())
    }
}
