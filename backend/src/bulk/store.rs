//! In-memory record collection of the active bulk session.
//!
//! The store owns the records, the photos still waiting for a match, and the
//! current selection used for preview and keyboard review. Every change to either
//! the record set or the photo set re-runs the photo matcher. While an export is
//! running, destructive operations are refused.

use crate::bulk::matcher;
use crate::error::BulkError;
use common::model::export::RecordStatusChange;
use common::model::photo::PhotoMapping;
use common::model::record::{Record, RecordStatus};
use common::requests::UpdateRecordRequest;
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    photos: Vec<PhotoMapping>,
    /// md5 digests of the pending photo uploads.
    photo_digests: Vec<String>,
    selected: Option<String>,
    exporting: bool,
}

/// Serializable view of the store for the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub records: Vec<Record>,
    pub pending_photos: Vec<String>,
    pub selected: Option<String>,
    pub busy: bool,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn pending_photos(&self) -> &[PhotoMapping] {
        &self.photos
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn selected(&self) -> Option<&Record> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True while an export runs or any record is being generated.
    pub fn is_busy(&self) -> bool {
        self.exporting
            || self
                .records
                .iter()
                .any(|r| r.status == RecordStatus::Generating)
    }

    fn ensure_idle(&self) -> Result<(), BulkError> {
        if self.is_busy() {
            return Err(BulkError::Busy);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: self.records.clone(),
            pending_photos: self.photos.iter().map(|p| p.file_name.clone()).collect(),
            selected: self.selected.clone(),
            busy: self.is_busy(),
        }
    }

    fn rematch(&mut self) -> usize {
        let matched = matcher::apply_matches(&mut self.records, &mut self.photos);
        if matched > 0 {
            // Consumed photos leave the pending set; keep digests aligned.
            self.photo_digests = self
                .photos
                .iter()
                .map(|p| digest(p.image.as_bytes()))
                .collect();
            info!("Matched {} photo(s) to records", matched);
        }
        matched
    }

    /// Append freshly imported records. Returns the number of new photo matches.
    pub fn append(&mut self, records: Vec<Record>) -> Result<usize, BulkError> {
        self.ensure_idle()?;
        info!(
            "Appending {} record(s) to {} existing",
            records.len(),
            self.records.len()
        );
        self.records.extend(records);
        Ok(self.rematch())
    }

    /// Add uploaded photos, ignoring byte-identical duplicates of pending ones.
    ///
    /// Returns `(accepted, matched)`.
    pub fn add_photos(&mut self, photos: Vec<PhotoMapping>) -> Result<(usize, usize), BulkError> {
        self.ensure_idle()?;
        let mut accepted = 0;
        for photo in photos {
            let d = digest(photo.image.as_bytes());
            if self.photo_digests.contains(&d) {
                warn!("Skipping duplicate photo upload '{}'", photo.file_name);
                continue;
            }
            self.photo_digests.push(d);
            self.photos.push(photo);
            accepted += 1;
        }
        Ok((accepted, self.rematch()))
    }

    pub fn remove(&mut self, id: &str) -> Result<Record, BulkError> {
        self.ensure_idle()?;
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BulkError::RecordNotFound(id.to_string()))?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.records.remove(index))
    }

    /// Drop every record, pending photo and the selection.
    pub fn clear(&mut self) -> Result<(), BulkError> {
        self.ensure_idle()?;
        self.records.clear();
        self.photos.clear();
        self.photo_digests.clear();
        self.selected = None;
        Ok(())
    }

    /// Merge an edit into one record and send it back to `Pending`.
    pub fn update(&mut self, id: &str, update: UpdateRecordRequest) -> Result<&Record, BulkError> {
        self.ensure_idle()?;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BulkError::RecordNotFound(id.to_string()))?;

        if let Some(key) = update
            .fields
            .keys()
            .chain(update.enabled.keys())
            .find(|key| record.field(**key).is_none())
        {
            return Err(BulkError::BadRequest(format!(
                "field '{key}' is not part of this record"
            )));
        }

        for (key, value) in update.fields {
            if let Some(field) = record.field_mut(key) {
                field.value = value;
            }
        }
        for (key, enabled) in update.enabled {
            if let Some(field) = record.field_mut(key) {
                field.enabled = enabled;
            }
        }
        if update.remove_photo {
            record.profile_photo = None;
            record.photo_matched = false;
        }
        if let Some(photo) = update.profile_photo {
            record.profile_photo = Some(photo);
            record.photo_matched = false;
        }
        record.reset_status();

        let index = self.records.iter().position(|r| r.id == id).unwrap_or(0);
        self.rematch();
        Ok(&self.records[index])
    }

    pub fn select(&mut self, id: &str) -> Result<&Record, BulkError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BulkError::RecordNotFound(id.to_string()))?;
        self.selected = Some(id.to_string());
        Ok(&self.records[index])
    }

    /// Move the selection forward, wrapping to the first record.
    pub fn select_next(&mut self) -> Option<&Record> {
        self.step(1)
    }

    /// Move the selection backward, wrapping to the last record.
    pub fn select_previous(&mut self) -> Option<&Record> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Option<&Record> {
        if self.records.is_empty() {
            self.selected = None;
            return None;
        }
        let len = self.records.len() as isize;
        let current = self
            .selected
            .as_deref()
            .and_then(|id| self.records.iter().position(|r| r.id == id));
        let next = match current {
            Some(i) => (i as isize + delta).rem_euclid(len) as usize,
            None if delta >= 0 => 0,
            None => (len - 1) as usize,
        };
        self.selected = Some(self.records[next].id.clone());
        self.records.get(next)
    }

    /// Enter export mode and hand out the records to export.
    ///
    /// Every record starts the run from `Pending`; results of an earlier run are
    /// dropped. Destructive edits fail until `finish_export`.
    pub fn begin_export(&mut self) -> Result<Vec<Record>, BulkError> {
        self.ensure_idle()?;
        self.exporting = true;
        for record in &mut self.records {
            record.reset_status();
        }
        Ok(self.records.clone())
    }

    pub fn finish_export(&mut self) {
        self.exporting = false;
    }

    /// Apply a status change reported by the exporter. Illegal transitions and
    /// unknown records are ignored with a warning.
    pub fn apply_status(&mut self, change: RecordStatusChange) {
        let Some(record) = self.records.iter_mut().find(|r| r.id == change.record_id) else {
            warn!("Status change for unknown record {}", change.record_id);
            return;
        };
        if !record.status.can_advance_to(change.status) {
            warn!(
                "Ignoring transition {:?} -> {:?} for row {}",
                record.status, change.status, record.row_index
            );
            return;
        }
        match change.status {
            RecordStatus::Generated => {
                record.mark_generated(change.generated_image.unwrap_or_default())
            }
            RecordStatus::Error => record.mark_failed(
                change
                    .error_message
                    .unwrap_or_else(|| "Generation failed".to_string()),
            ),
            other => {
                record.status = other;
                record.error_message = None;
                record.generated_image = None;
            }
        }
    }
}

fn digest(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}
