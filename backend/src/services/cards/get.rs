use crate::storage::CardRepository;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// `GET /api/cards/{id}`
pub(crate) async fn process(
    repo: web::Data<CardRepository>,
    id: web::Path<String>,
) -> impl Responder {
    match repo.get(&id) {
        Ok(card) => HttpResponse::Ok().json(card),
        Err(e) => e.error_response(),
    }
}

/// `GET /api/cards/owner/{owner}`
pub(crate) async fn list_for_owner(
    repo: web::Data<CardRepository>,
    owner: web::Path<String>,
) -> impl Responder {
    match repo.list_for_owner(&owner) {
        Ok(cards) => HttpResponse::Ok().json(cards),
        Err(e) => e.error_response(),
    }
}
