//! Error taxonomy of the bulk pipeline and its HTTP mapping.
//!
//! Import errors are fatal to one import attempt, validation failures block an
//! export before anything is generated, render errors stay local to one record,
//! and packaging errors end an export run without producing an archive. Every
//! variant carries a short user-facing message; the underlying cause is logged
//! when the error is turned into a response.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::validation::ValidationResult;
use log::{error, warn};

/// Reasons an uploaded spreadsheet cannot be imported.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported file type '{0}'. Please upload a .csv, .xlsx or .xls file")]
    UnsupportedExtension(String),

    #[error("The file must contain a header row and at least one data row")]
    TooFewRows,

    #[error("No records found in the file")]
    NoRecords,

    #[error("The CSV file is malformed: {0}")]
    Malformed(String),

    #[error("The spreadsheet could not be read: {0}")]
    Workbook(String),

    #[error("The file is not valid UTF-8 text")]
    Encoding,
}

/// Failure of the render capability for a single card.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid card configuration: {0}")]
    Config(String),

    #[error("photo could not be decoded: {0}")]
    Photo(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("render target has no loaded card")]
    NotLoaded,
}

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("An export is in progress; try again when it finishes")]
    Busy,

    #[error("Validation failed with {} error(s)", .0.errors.len())]
    ValidationFailed(ValidationResult),

    #[error("No cards were generated successfully")]
    NothingGenerated,

    #[error("Archive could not be created: {0}")]
    Packaging(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<zip::result::ZipError> for BulkError {
    fn from(err: zip::result::ZipError) -> Self {
        BulkError::Packaging(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for BulkError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        BulkError::Upload(err.to_string())
    }
}

impl BulkError {
    /// Message safe to show to the user. Internal failures get a generic text.
    pub fn user_message(&self) -> String {
        match self {
            BulkError::Packaging(_) => "The archive could not be created".to_string(),
            BulkError::Storage(_) | BulkError::Io(_) | BulkError::Serde(_) => {
                "Something went wrong while saving; please try again".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for BulkError {
    fn status_code(&self) -> StatusCode {
        match self {
            BulkError::Import(_) | BulkError::Upload(_) | BulkError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            BulkError::RecordNotFound(_) | BulkError::NotFound(_) => StatusCode::NOT_FOUND,
            BulkError::Busy => StatusCode::CONFLICT,
            BulkError::ValidationFailed(_) | BulkError::NothingGenerated => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BulkError::Packaging(_)
            | BulkError::Storage(_)
            | BulkError::Io(_)
            | BulkError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        match self {
            BulkError::ValidationFailed(result) => HttpResponse::build(status).json(result),
            _ => HttpResponse::build(status).body(self.user_message()),
        }
    }
}
