use crate::model::record::RecordStatus;
use serde::{Deserialize, Serialize};

/// Phase of one export run. Always traversed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPhase {
    Validating,
    Generating,
    Packaging,
    Complete,
}

/// Progress of the running export, reported after every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProgress {
    pub current: usize,
    pub total: usize,
    pub phase: ExportPhase,
    pub message: String,
}

impl ExportProgress {
    pub fn new(phase: ExportPhase, current: usize, total: usize, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            phase,
            message: message.into(),
        }
    }

    /// Whole-number completion percentage.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f32 / self.total as f32) * 100.0) as u32
    }
}

/// Status change for one record, emitted by the exporter as it walks the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatusChange {
    pub record_id: String,
    pub status: RecordStatus,
    pub generated_image: Option<String>,
    pub error_message: Option<String>,
}

/// Final outcome of a successful export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub archive_name: String,
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
}
