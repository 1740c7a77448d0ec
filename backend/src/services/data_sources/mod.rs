//! Data sources of a bulk session: the spreadsheet, the photos and the template.
//!
//! The provided routes are:
//! - `POST /api/data_sources/import`: multipart upload with a `file` field holding a
//!   `.csv`, `.xlsx` or `.xls` file. Parsed rows are appended to the session's
//!   records and matched against pending photos.
//!
//! - `POST /api/data_sources/photos`: multipart upload of any number of image files.
//!   Each one becomes a photo mapping keyed by its file name; the matcher then runs
//!   over all records.
//!
//! - `GET /api/data_sources/template`: a CSV template for the session's category.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod import;
mod photos;
mod template;
mod upload;

const API_PATH: &str = "/api/data_sources";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/import", post().to(import::process))
        .route("/photos", post().to(photos::process))
        .route("/template", get().to(template::process))
}
