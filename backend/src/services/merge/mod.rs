mod download;
mod start;
mod status;
mod validate;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all export routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/validate", post().to(validate::process))
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/download/{job_id}", get().to(download::process))
}
