use crate::bulk::template::{build_template, template_file_name};
use crate::error::BulkError;
use crate::session::SessionState;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// `GET /api/data_sources/template`: CSV template for the current category.
pub(crate) async fn process(session: web::Data<SessionState>) -> impl Responder {
    let category = session.design.read().await.category;
    match build_template(category) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition::attachment(template_file_name(category)))
            .body(bytes),
        Err(e) => BulkError::Io(e.into()).error_response(),
    }
}
