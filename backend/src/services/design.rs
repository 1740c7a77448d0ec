//! `GET /api/design` and `PUT /api/design`: the session-wide card design.
//!
//! Changing the category does not touch records that were already imported; it
//! decides the field set of later imports and of the template.

use crate::error::BulkError;
use crate::render::parse_hex_color;
use crate::session::SessionState;
use actix_web::web::{get, put, scope};
use actix_web::{web, HttpResponse, Responder, ResponseError, Scope};
use common::model::design::DesignSettings;
use log::info;

const API_PATH: &str = "/api/design";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(read))
        .route("", put().to(replace))
}

async fn read(session: web::Data<SessionState>) -> impl Responder {
    HttpResponse::Ok().json(&*session.design.read().await)
}

async fn replace(
    session: web::Data<SessionState>,
    payload: web::Json<DesignSettings>,
) -> impl Responder {
    let design = payload.into_inner();
    for color in [&design.primary_color, &design.secondary_color, &design.text_color] {
        if let Err(e) = parse_hex_color(color) {
            return BulkError::BadRequest(e.to_string()).error_response();
        }
    }
    info!(
        "Design updated: '{}' ({})",
        design.institution_name,
        design.category.as_str()
    );
    *session.design.write().await = design.clone();
    HttpResponse::Ok().json(design)
}
