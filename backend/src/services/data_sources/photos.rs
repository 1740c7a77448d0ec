use super::upload::collect_files;
use crate::config::AppConfig;
use crate::error::BulkError;
use crate::media::{data_url_for_file, is_photo_file};
use crate::session::SessionState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::photo::PhotoMapping;
use common::requests::PhotoUploadResponse;
use log::{info, warn};

/// `POST /api/data_sources/photos`
pub(crate) async fn process(
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> impl Responder {
    match upload_photos(&session, &config, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

async fn upload_photos(
    session: &SessionState,
    config: &AppConfig,
    payload: Multipart,
) -> Result<PhotoUploadResponse, BulkError> {
    let files = collect_files(payload, config.max_upload_bytes).await?;
    if files.is_empty() {
        return Err(BulkError::Upload("No photos were uploaded".to_string()));
    }

    let mut response = PhotoUploadResponse::default();
    let mut photos = Vec::with_capacity(files.len());
    for file in files {
        if !is_photo_file(&file.file_name) {
            warn!("Skipping '{}': not a png, jpg or webp image", file.file_name);
            response.skipped.push(file.file_name);
            continue;
        }
        let image = data_url_for_file(&file.file_name, &file.bytes);
        photos.push(PhotoMapping::from_file_name(&file.file_name, image));
    }

    let offered = photos.len();
    let mut store = session.store.write().await;
    let (accepted, matched) = store.add_photos(photos)?;
    info!(
        "Photo upload: {} accepted, {} matched, {} skipped",
        accepted,
        matched,
        response.skipped.len()
    );

    response.accepted = accepted;
    response.matched = matched;
    response.duplicates = offered - accepted;
    response.pending = store.pending_photos().len();
    Ok(response)
}
