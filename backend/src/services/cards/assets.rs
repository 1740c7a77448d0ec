use crate::error::BulkError;
use crate::storage::CardRepository;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use mime_guess::from_path;
use std::io::ErrorKind;

/// Serve a stored card image from the asset directory.
pub(crate) async fn process(
    repo: web::Data<CardRepository>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (owner, file) = path.into_inner();
    let Some(file_path) = repo.asset_path(&owner, &file) else {
        return HttpResponse::NotFound().body("Not Found");
    };
    match web::block(move || std::fs::read(file_path)).await {
        Ok(Ok(bytes)) => {
            let mime = from_path(&file).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(bytes)
        }
        Ok(Err(e)) if e.kind() == ErrorKind::NotFound => HttpResponse::NotFound().body("Not Found"),
        Ok(Err(e)) => BulkError::Io(e).error_response(),
        Err(e) => BulkError::Io(std::io::Error::other(e.to_string())).error_response(),
    }
}
