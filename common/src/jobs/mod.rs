use crate::model::export::{ExportProgress, ExportSummary};
use crate::model::validation::ValidationResult;
use serde::{Deserialize, Serialize};

/// Lifecycle of a background export job as seen by pollers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(ExportProgress),
    Completed(ExportSummary),
    /// The sync-check failed; nothing was generated.
    Rejected(ValidationResult),
    Failed(String),
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Rejected(_) | Self::Failed(_))
    }
}
