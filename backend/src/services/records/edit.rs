use crate::error::BulkError;
use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::UpdateRecordRequest;
use log::info;

pub(crate) async fn list(session: web::Data<SessionState>) -> impl Responder {
    HttpResponse::Ok().json(session.store.read().await.snapshot())
}

pub(crate) async fn get(session: web::Data<SessionState>, id: web::Path<String>) -> impl Responder {
    match session.store.read().await.get(&id) {
        Some(record) => HttpResponse::Ok().json(record),
        None => BulkError::RecordNotFound(id.into_inner()).error_response(),
    }
}

pub(crate) async fn update(
    session: web::Data<SessionState>,
    id: web::Path<String>,
    payload: web::Json<UpdateRecordRequest>,
) -> impl Responder {
    let update = payload.into_inner();
    if update.is_empty() {
        return BulkError::BadRequest("nothing to update".to_string()).error_response();
    }
    let mut store = session.store.write().await;
    match store.update(&id, update) {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => e.error_response(),
    }
}

pub(crate) async fn remove(
    session: web::Data<SessionState>,
    id: web::Path<String>,
) -> impl Responder {
    let mut store = session.store.write().await;
    match store.remove(&id) {
        Ok(record) => {
            info!("Removed record at row {}", record.row_index);
            HttpResponse::NoContent().finish()
        }
        Err(e) => e.error_response(),
    }
}

pub(crate) async fn clear(session: web::Data<SessionState>) -> impl Responder {
    let mut store = session.store.write().await;
    match store.clear() {
        Ok(()) => {
            info!("Cleared all records");
            HttpResponse::NoContent().finish()
        }
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::bulk::parser::parse_file;
    use crate::services::records::configure_routes;
    use crate::session::SessionState;
    use actix_web::{http::StatusCode, test, web, App};
    use common::model::field::{Category, FieldKey};
    use common::model::record::{Record, RecordStatus};
    use common::model::export::RecordStatusChange;
    use serde_json::json;

    async fn session_with_records() -> (SessionState, Vec<String>) {
        let session = SessionState::new();
        let records =
            parse_file("c.csv", b"Name,Roll No\nAsha,R100\nBen,R101\n", Category::School).unwrap();
        let ids = records.iter().map(|r| r.id.clone()).collect();
        session.store.write().await.append(records).unwrap();
        (session, ids)
    }

    #[actix_web::test]
    async fn test_patch_edits_and_resets_status() {
        let (session, ids) = session_with_records().await;
        {
            let mut store = session.store.write().await;
            for status in [RecordStatus::Validated, RecordStatus::Generating, RecordStatus::Error] {
                store.apply_status(RecordStatusChange {
                    record_id: ids[0].clone(),
                    status,
                    generated_image: None,
                    error_message: Some("Failed".into()),
                });
            }
        }
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri(&format!("/api/records/{}", ids[0]))
            .set_json(json!({ "fields": { "name": "Asha Rao" }, "enabled": { "phone": false } }))
            .to_request();
        let record: Record = test::call_and_read_body_json(&app, req).await;
        assert_eq!(record.value(FieldKey::Name), "Asha Rao");
        assert!(!record.field(FieldKey::Phone).unwrap().enabled);
        assert_eq!(record.status, RecordStatus::Pending);
        assert!(record.error_message.is_none());
    }

    #[actix_web::test]
    async fn test_unknown_record_and_empty_patch() {
        let (session, ids) = session_with_records().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/records/nope").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::patch()
            .uri(&format!("/api/records/{}", ids[1]))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_remove_and_clear_are_blocked_while_exporting() {
        let (session, ids) = session_with_records().await;
        session.store.write().await.begin_export().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/records/{}", ids[0]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        session.store.write().await.finish_export();
        let req = test::TestRequest::delete().uri("/api/records").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        assert!(session.store.read().await.is_empty());
    }
}
