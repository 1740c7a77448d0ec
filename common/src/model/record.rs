use crate::model::field::{FieldKey, FieldValue, IDENTIFIER_KEYS};
use serde::{Deserialize, Serialize};

/// Generation state of a single record.
///
/// `Pending -> Validated -> Generating -> Generated`, with `Error` reachable only
/// from `Generating`. Any edit sends a record back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Validated,
    Generating,
    Generated,
    Error,
}

impl RecordStatus {
    /// Whether the exporter may move a record from `self` to `next`.
    ///
    /// Resetting to `Pending` is not an exporter transition; it happens on edit.
    pub fn can_advance_to(&self, next: RecordStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Validated)
                | (Self::Validated, Self::Generating)
                | (Self::Generating, Self::Generated)
                | (Self::Generating, Self::Error)
        )
    }
}

/// One imported row destined to become one rendered card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    /// 1-based data row number in the source file.
    pub row_index: usize,
    pub fields: Vec<FieldValue>,
    pub profile_photo: Option<String>,
    /// True only when the photo came from automatic identifier matching.
    pub photo_matched: bool,
    pub status: RecordStatus,
    pub error_message: Option<String>,
    pub generated_image: Option<String>,
}

impl Record {
    pub fn new(id: String, row_index: usize, fields: Vec<FieldValue>) -> Self {
        Self {
            id,
            row_index,
            fields,
            profile_photo: None,
            photo_matched: false,
            status: RecordStatus::Pending,
            error_message: None,
            generated_image: None,
        }
    }

    pub fn field(&self, key: FieldKey) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn field_mut(&mut self, key: FieldKey) -> Option<&mut FieldValue> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    /// Trimmed value of `key`, or `""` when the field is absent.
    pub fn value(&self, key: FieldKey) -> &str {
        self.field(key).map(|f| f.value.trim()).unwrap_or("")
    }

    /// First non-empty identifier value (`rollNo`, `enrollmentNo`, `employeeId`,
    /// `participantId`, in that order).
    pub fn identifier(&self) -> Option<&str> {
        IDENTIFIER_KEYS
            .iter()
            .map(|key| self.value(*key))
            .find(|v| !v.is_empty())
    }

    pub fn has_photo(&self) -> bool {
        self.profile_photo
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// Back to `Pending` after the underlying data changed.
    pub fn reset_status(&mut self) {
        self.status = RecordStatus::Pending;
        self.error_message = None;
        self.generated_image = None;
    }

    pub fn mark_generated(&mut self, image: String) {
        self.status = RecordStatus::Generated;
        self.error_message = None;
        self.generated_image = Some(image);
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = RecordStatus::Error;
        self.error_message = Some(message.into());
        self.generated_image = None;
    }
}
