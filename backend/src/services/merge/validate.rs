use crate::bulk::validator::validate;
use crate::config::AppConfig;
use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::ValidateResponse;
use log::info;

/// `POST /api/merge/validate`: run the sync-check on the current records.
///
/// Always `200 OK`; `result.isValid` tells whether an export would be allowed.
pub(crate) async fn process(
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let result = validate(session.store.read().await.records());
    info!(
        "Sync-check: {} record(s), {} error(s), {} warning(s)",
        result.records_validated,
        result.errors.len(),
        result.warnings.len()
    );
    let notice = result.notice(config.warning_display_limit);
    HttpResponse::Ok().json(ValidateResponse { result, notice })
}
