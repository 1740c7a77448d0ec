use crate::error::BulkError;
use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

pub(crate) async fn selected(session: web::Data<SessionState>) -> impl Responder {
    match session.store.read().await.selected() {
        Some(record) => HttpResponse::Ok().json(record),
        None => BulkError::NotFound("Selected record".to_string()).error_response(),
    }
}

pub(crate) async fn select(
    session: web::Data<SessionState>,
    id: web::Path<String>,
) -> impl Responder {
    let mut store = session.store.write().await;
    match store.select(&id) {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => e.error_response(),
    }
}

pub(crate) async fn next(session: web::Data<SessionState>) -> impl Responder {
    let mut store = session.store.write().await;
    match store.select_next() {
        Some(record) => HttpResponse::Ok().json(record),
        None => BulkError::NotFound("Record".to_string()).error_response(),
    }
}

pub(crate) async fn previous(session: web::Data<SessionState>) -> impl Responder {
    let mut store = session.store.write().await;
    match store.select_previous() {
        Some(record) => HttpResponse::Ok().json(record),
        None => BulkError::NotFound("Record".to_string()).error_response(),
    }
}

#[cfg(test)]
mod tests {
    use crate::bulk::parser::parse_file;
    use crate::services::records::configure_routes;
    use crate::session::SessionState;
    use actix_web::{http::StatusCode, test, web, App};
    use common::model::field::Category;
    use common::model::record::Record;

    #[actix_web::test]
    async fn test_navigation_wraps_around() {
        let session = SessionState::new();
        let records =
            parse_file("c.csv", b"Name\nAsha\nBen\nChen\n", Category::Event).unwrap();
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        session.store.write().await.append(records).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/records/select/{}", ids[2]))
            .to_request();
        let selected: Record = test::call_and_read_body_json(&app, req).await;
        assert_eq!(selected.id, ids[2]);

        let req = test::TestRequest::get().uri("/api/records/selected").to_request();
        let current: Record = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current.id, ids[2]);

        let req = test::TestRequest::post().uri("/api/records/next").to_request();
        let next: Record = test::call_and_read_body_json(&app, req).await;
        assert_eq!(next.id, ids[0]);

        let req = test::TestRequest::post().uri("/api/records/previous").to_request();
        let previous: Record = test::call_and_read_body_json(&app, req).await;
        assert_eq!(previous.id, ids[2]);
    }

    #[actix_web::test]
    async fn test_navigation_on_empty_store() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(SessionState::new()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post().uri("/api/records/next").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
