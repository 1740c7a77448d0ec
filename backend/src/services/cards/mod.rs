//! # Saved Card Service
//!
//! Persistence for cards designed one at a time.
//!
//! *   **`POST /api/cards/save`**: insert or replace a card. The optional rendered
//!     image (a `data:` URL) is stored as a blob and replaced by its durable URL.
//! *   **`GET /api/cards/{id}`**: one saved card.
//! *   **`GET /api/cards/owner/{owner}`**: all cards of one owner.
//! *   **`GET /assets/{owner}/{file}`**: the stored card images.

mod assets;
mod get;
mod save;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/cards";
const ASSETS_PATH: &str = "/assets";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("/owner/{owner}", get().to(get::list_for_owner))
        .route("/{id}", get().to(get::process))
}

pub fn configure_assets() -> Scope {
    scope(ASSETS_PATH).route("/{owner}/{file}", get().to(assets::process))
}
