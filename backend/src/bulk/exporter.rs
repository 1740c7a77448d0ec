//! # Batch Exporter
//!
//! Drives one export run over a snapshot of the session's records:
//!
//! 1.  **Validating**: the sync-check runs first. If any record is missing
//!     required data the run stops with `BulkError::ValidationFailed` before a
//!     single record enters `generating`. Otherwise every record moves to
//!     `validated`.
//!
//! 2.  **Generating**: records are rendered strictly one at a time, in stored
//!     order, through the single render target. For each record the exporter
//!     composes a `CardConfig` (design + fields + photo, falling back to the base
//!     photo), loads it, waits for the target, and captures a PNG. A failure marks
//!     that record `error` with a fixed message and the loop moves on.
//!
//! 3.  **Packaging**: only generated cards are archived. Zero successes end the run
//!     with `BulkError::NothingGenerated`; no empty archive is ever produced.
//!
//! 4.  **Complete**: the archive and a summary are returned to the caller, which
//!     offers the download.
//!
//! Progress and per-record status changes are pushed through the `emit` callback
//! as they happen, so callers can observe large batches incrementally. Progress
//! counters never decrease within a run.

use crate::bulk::archive::{archive_name, build_archive, CardImage, ExportArchive};
use crate::bulk::validator::validate;
use crate::error::{BulkError, RenderError};
use crate::media::to_data_url;
use crate::render::CardRenderer;
use chrono::NaiveDate;
use common::model::design::{CardConfig, DesignSettings};
use common::model::export::{
    ExportPhase, ExportProgress, ExportSummary, RecordStatusChange,
};
use common::model::field::FieldKey;
use common::model::record::{Record, RecordStatus};
use log::{info, warn};
use std::time::Duration;

/// Message stored on a record whose card could not be rendered.
pub const GENERATION_FAILED: &str = "Failed to generate ID card";

/// Knobs for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Bound handed to `CardRenderer::wait_until_ready`.
    pub settle: Duration,
    /// Resolution multiplier for `CardRenderer::capture`.
    pub scale: u32,
    pub compression_level: i64,
    /// Date stamped into the archive name.
    pub date: NaiveDate,
}

/// Everything the exporter reports while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Progress(ExportProgress),
    Status(RecordStatusChange),
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub archive: ExportArchive,
    pub summary: ExportSummary,
}

/// Build the render input for one record.
pub fn compose_config(design: &DesignSettings, record: &Record) -> CardConfig {
    let photo = if record.has_photo() {
        record.profile_photo.clone()
    } else {
        design.base_photo.clone()
    };
    CardConfig {
        design: design.clone(),
        fields: record.fields.clone(),
        photo,
    }
}

fn status(record: &Record, status: RecordStatus) -> ExportEvent {
    ExportEvent::Status(RecordStatusChange {
        record_id: record.id.clone(),
        status,
        generated_image: None,
        error_message: None,
    })
}

pub struct BatchExporter<R: CardRenderer> {
    renderer: R,
    options: ExportOptions,
}

impl<R: CardRenderer> BatchExporter<R> {
    pub fn new(renderer: R, options: ExportOptions) -> Self {
        Self { renderer, options }
    }

    fn render_one(&mut self, design: &DesignSettings, record: &Record) -> Result<Vec<u8>, RenderError> {
        let config = compose_config(design, record);
        self.renderer.load(&config)?;
        self.renderer.wait_until_ready(self.options.settle);
        self.renderer.capture(self.options.scale)
    }

    /// Run the full validate → generate → package sequence over `records`.
    pub fn run(
        &mut self,
        records: &[Record],
        design: &DesignSettings,
        mut emit: impl FnMut(ExportEvent),
    ) -> Result<ExportOutcome, BulkError> {
        let total = records.len();

        emit(ExportEvent::Progress(ExportProgress::new(
            ExportPhase::Validating,
            0,
            total,
            "Validating records...",
        )));
        let validation = validate(records);
        if !validation.is_valid {
            info!(
                "Export stopped: {} record(s) failed validation",
                validation.errors.len()
            );
            return Err(BulkError::ValidationFailed(validation));
        }
        for record in records {
            emit(status(record, RecordStatus::Validated));
        }

        let mut cards = Vec::new();
        let mut failed = 0;
        for (i, record) in records.iter().enumerate() {
            emit(status(record, RecordStatus::Generating));
            match self.render_one(design, record) {
                Ok(png) => {
                    emit(ExportEvent::Status(RecordStatusChange {
                        record_id: record.id.clone(),
                        status: RecordStatus::Generated,
                        generated_image: Some(to_data_url("image/png", &png)),
                        error_message: None,
                    }));
                    cards.push(CardImage {
                        name: record.value(FieldKey::Name).to_string(),
                        identifier: record.identifier().unwrap_or_default().to_string(),
                        row_index: record.row_index,
                        png,
                    });
                }
                Err(e) => {
                    warn!("Row {}: card generation failed: {}", record.row_index, e);
                    failed += 1;
                    emit(ExportEvent::Status(RecordStatusChange {
                        record_id: record.id.clone(),
                        status: RecordStatus::Error,
                        generated_image: None,
                        error_message: Some(GENERATION_FAILED.to_string()),
                    }));
                }
            }
            emit(ExportEvent::Progress(ExportProgress::new(
                ExportPhase::Generating,
                i + 1,
                total,
                format!("Generating card {} of {}", i + 1, total),
            )));
        }

        emit(ExportEvent::Progress(ExportProgress::new(
            ExportPhase::Packaging,
            total,
            total,
            format!("Packaging {} card(s)...", cards.len()),
        )));
        let file_name = archive_name(&design.institution_name, self.options.date);
        let archive = build_archive(&cards, file_name, self.options.compression_level)?;

        let summary = ExportSummary {
            archive_name: archive.file_name.clone(),
            total,
            generated: cards.len(),
            failed,
        };
        emit(ExportEvent::Progress(ExportProgress::new(
            ExportPhase::Complete,
            total,
            total,
            format!("Export complete: {} of {} card(s) generated", summary.generated, total),
        )));
        info!(
            "Export finished: {} generated, {} failed, archive '{}'",
            summary.generated, summary.failed, summary.archive_name
        );
        Ok(ExportOutcome { archive, summary })
    }
}
