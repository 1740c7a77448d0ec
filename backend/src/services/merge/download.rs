use crate::error::BulkError;
use crate::job_controller::state::JobsState;
use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// `GET /api/merge/download/{job_id}`: the ZIP of a completed export.
///
/// Only jobs that reached `Completed` have an archive; anything else is `404`.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let archives = state.archives.read().await;
    match archives.get(job_id.as_str()) {
        Some(archive) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header(ContentDisposition::attachment(archive.file_name.clone()))
            .body(archive.bytes.clone()),
        None => BulkError::NotFound(format!("Archive for job {job_id}")).error_response(),
    }
}
