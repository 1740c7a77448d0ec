use crate::storage::CardRepository;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::SaveCardRequest;

/// `POST /api/cards/save`: returns the stored `SavedCard`.
pub(crate) async fn process(
    repo: web::Data<CardRepository>,
    payload: web::Json<SaveCardRequest>,
) -> impl Responder {
    match repo.save(payload.into_inner()) {
        Ok(card) => HttpResponse::Ok().json(card),
        Err(e) => e.error_response(),
    }
}
