//! # Record Editing Service
//!
//! Review and correction of imported records before export.
//!
//! *   **`GET /`**: every record, the pending photos, the current selection and the
//!     busy flag.
//! *   **`DELETE /`**: remove all records and pending photos.
//! *   **`GET /{id}`**, **`PATCH /{id}`**, **`DELETE /{id}`**: read, edit or remove
//!     one record. An edit sends the record back to `pending` and re-runs photo
//!     matching.
//! *   **`GET /selected`**: the record currently shown in the preview.
//! *   **`POST /select/{id}`**, **`POST /next`**, **`POST /previous`**: move the
//!     preview selection. Next and previous wrap around.
//!
//! Destructive calls answer `409 Conflict` while an export is running.

mod edit;
mod navigate;

use actix_web::web::{delete, get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/records";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(edit::list))
        .route("", delete().to(edit::clear))
        .route("/selected", get().to(navigate::selected))
        .route("/next", post().to(navigate::next))
        .route("/previous", post().to(navigate::previous))
        .route("/select/{id}", post().to(navigate::select))
        .route("/{id}", get().to(edit::get))
        .route("/{id}", patch().to(edit::update))
        .route("/{id}", delete().to(edit::remove))
}
