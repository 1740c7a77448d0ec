use super::upload::{collect_files, UploadedFile};
use crate::bulk::parser::parse_file;
use crate::config::AppConfig;
use crate::error::BulkError;
use crate::session::SessionState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::ImportResponse;

/// `POST /api/data_sources/import`
///
/// - `200 OK` with an `ImportResponse`.
/// - `400 Bad Request` when the file is missing, of the wrong type or unreadable.
/// - `409 Conflict` while an export is running.
pub(crate) async fn process(
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> impl Responder {
    match import_records(&session, &config, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

async fn import_records(
    session: &SessionState,
    config: &AppConfig,
    payload: Multipart,
) -> Result<ImportResponse, BulkError> {
    let UploadedFile { file_name, bytes } = collect_files(payload, config.max_upload_bytes)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| BulkError::Upload("Missing file".to_string()))?;

    if session.store.read().await.is_busy() {
        return Err(BulkError::Busy);
    }
    let category = session.design.read().await.category;

    // Workbooks can be large; keep parsing off the async workers.
    let records = web::block(move || parse_file(&file_name, &bytes, category))
        .await
        .map_err(|e| BulkError::Upload(e.to_string()))??;

    let imported = records.len();
    let mut store = session.store.write().await;
    let photos_matched = store.append(records)?;
    Ok(ImportResponse {
        imported,
        photos_matched,
        total_records: store.len(),
    })
}
