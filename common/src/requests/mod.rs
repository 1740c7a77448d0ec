use crate::model::design::CardConfig;
use crate::model::field::FieldKey;
use crate::model::validation::{ValidationNotice, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partial edit of one record. Any accepted edit resets the record to `pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    /// New values keyed by field.
    #[serde(default)]
    pub fields: BTreeMap<FieldKey, String>,
    /// Fields to show or hide on the card.
    #[serde(default)]
    pub enabled: BTreeMap<FieldKey, bool>,
    /// Manually chosen photo (URL or inline data).
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub remove_photo: bool,
}

impl UpdateRecordRequest {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.enabled.is_empty()
            && self.profile_photo.is_none()
            && !self.remove_photo
    }
}

/// Request payload for saving a single card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCardRequest {
    /// Existing card id to overwrite; a new id is assigned when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub owner: String,
    pub config: CardConfig,
    /// Rendered card as a `data:image/png;base64,...` URL.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExportResponse {
    pub job_id: String,
}

/// Outcome of a spreadsheet import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
    pub photos_matched: usize,
    pub total_records: usize,
}

/// Outcome of a photo upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadResponse {
    pub accepted: usize,
    pub matched: usize,
    /// Files ignored because they are not a supported image type.
    pub skipped: Vec<String>,
    /// Uploads whose bytes are identical to a photo already pending.
    pub duplicates: usize,
    pub pending: usize,
}

/// Sync-check result plus what should be surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub result: ValidationResult,
    pub notice: ValidationNotice,
}
