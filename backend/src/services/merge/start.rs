//! # Export Job Start Service
//!
//! This module provides the `POST /api/merge/start` endpoint, which turns every
//! record of the session into a rendered card and packages them into one ZIP.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: `process` calls `schedule_export_job`, which:
//!     - Puts the record store into export mode and takes a snapshot of the
//!       records and the design. A second export, or any destructive edit, is
//!       refused with `409 Conflict` until this one finishes.
//!     - Registers a job in `Pending` and returns its `job_id` right away.
//!     - Spawns a Tokio task that owns the rest of the job.
//!
//! 2.  **Background Processing**: the task runs `export_blocking` through
//!     `tokio::task::spawn_blocking`, so rendering and compression stay off the
//!     async runtime. The `BatchExporter` validates, renders each record in order
//!     and packages the successes.
//!
//! 3.  **Event Forwarding**: the worker sends `ExportEvent`s over a dedicated
//!     channel to a listener task. Progress becomes `JobStatus::InProgress` for the
//!     central job controller; record status changes are applied to the store.
//!
//! 4.  **Completion**: once the worker returns and the listener has drained every
//!     event, the store leaves export mode. A finished archive is stored under the
//!     job id before the job is reported `Completed`. Only the latest archive is
//!     kept; starting a new export drops the previous one. A failed sync-check ends the
//!     job as `Rejected` with the full validation result; any other failure ends it
//!     as `Failed` with a short message.

use crate::bulk::exporter::{BatchExporter, ExportEvent, ExportOptions, ExportOutcome};
use crate::config::AppConfig;
use crate::error::BulkError;
use crate::job_controller::state::JobsState;
use crate::render::RasterRenderer;
use crate::session::SessionState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Local;
use common::jobs::JobStatus;
use common::model::design::DesignSettings;
use common::model::record::Record;
use common::requests::StartExportResponse;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;

/// `POST /api/merge/start`
///
/// - `202 Accepted` with a `StartExportResponse`.
/// - `409 Conflict` when an export is already running.
pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    session: web::Data<SessionState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match schedule_export_job(&jobs, &session, &config).await {
        Ok(job_id) => HttpResponse::Accepted().json(StartExportResponse { job_id }),
        Err(e) => e.error_response(),
    }
}

async fn schedule_export_job(
    jobs: &JobsState,
    session: &SessionState,
    config: &AppConfig,
) -> Result<String, BulkError> {
    let records = session.store.write().await.begin_export()?;
    jobs.discard_archives().await;
    let design = session.design.read().await.clone();
    let options = ExportOptions {
        settle: config.render_settle,
        scale: config.render_scale,
        compression_level: config.compression_level,
        date: Local::now().date_naive(),
    };

    let job_id = jobs.register().await;
    info!("Export job {} started for {} record(s)", job_id, records.len());

    let jobs = jobs.clone();
    let session = session.clone();
    let job_id_clone = job_id.clone();

    tokio::spawn(async move {
        let job_id = job_id_clone;
        let (event_tx, mut event_rx) = mpsc::channel::<ExportEvent>(100);

        let listener_jobs = jobs.clone();
        let listener_session = session.clone();
        let listener_job_id = job_id.clone();
        let listener = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                match event {
                    ExportEvent::Progress(progress) => {
                        debug!(
                            "Job {}: {:?} {}/{}",
                            listener_job_id, progress.phase, progress.current, progress.total
                        );
                        listener_jobs
                            .send(&listener_job_id, JobStatus::InProgress(progress))
                            .await;
                    }
                    ExportEvent::Status(change) => {
                        listener_session.store.write().await.apply_status(change);
                    }
                }
            }
        });

        let handle = tokio::task::spawn_blocking(move || {
            export_blocking(event_tx, &records, &design, options)
        });
        let result = handle.await;

        // The worker dropped its sender; wait until every event has been applied.
        if let Err(e) = listener.await {
            error!("Event listener of job {} stopped: {}", job_id, e);
        }
        session.store.write().await.finish_export();

        let status = match result {
            Ok(Ok(outcome)) => {
                let summary = outcome.summary;
                jobs.store_archive(&job_id, outcome.archive).await;
                JobStatus::Completed(summary)
            }
            Ok(Err(BulkError::ValidationFailed(validation))) => JobStatus::Rejected(validation),
            Ok(Err(e)) => {
                warn!("Export job {} failed: {}", job_id, e);
                JobStatus::Failed(e.user_message())
            }
            Err(e) => {
                error!("Export job {} panicked or was cancelled: {}", job_id, e);
                JobStatus::Failed("The export stopped unexpectedly".to_string())
            }
        };
        jobs.send(&job_id, status).await;
    });

    Ok(job_id)
}

/// Run one export on the current thread, forwarding every event to `tx`.
fn export_blocking(
    tx: mpsc::Sender<ExportEvent>,
    records: &[Record],
    design: &DesignSettings,
    options: ExportOptions,
) -> Result<ExportOutcome, BulkError> {
    let mut exporter = BatchExporter::new(RasterRenderer::new(), options);
    exporter.run(records, design, |event| {
        // A closed channel only means nobody is listening any more.
        let _ = tx.blocking_send(event);
    })
}

#[cfg(test)]
mod tests {
    use crate::bulk::parser::parse_file;
    use crate::job_controller::state::JobsState;
    use crate::services::merge::configure_routes;
    use crate::services::test_support::{jobs_state, test_config};
    use crate::session::SessionState;
    use actix_web::{http::StatusCode, test, web, App};
    use common::jobs::JobStatus;
    use common::model::field::Category;
    use common::model::record::RecordStatus;
    use common::requests::StartExportResponse;
    use std::io::Cursor;
    use std::time::Duration;
    use zip::ZipArchive;

    async fn wait_for_finish(jobs: &JobsState, job_id: &str) -> JobStatus {
        for _ in 0..500 {
            if let Some(status) = jobs.status(job_id).await {
                if status.is_finished() {
                    return status;
                }
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {job_id} did not finish");
    }

    async fn session_from(csv: &[u8]) -> SessionState {
        let session = SessionState::new();
        session.design.write().await.institution_name = "Green Valley".into();
        session
            .store
            .write()
            .await
            .append(parse_file("c.csv", csv, Category::School).unwrap())
            .unwrap();
        session
    }

    #[actix_web::test]
    async fn test_export_job_produces_downloadable_archive() {
        let session = session_from(b"Name,Roll No\nAsha Rao,R100\nBen Lee,R101\n").await;
        let jobs = jobs_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(test_config()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/merge/start").to_request();
        let started: StartExportResponse = test::call_and_read_body_json(&app, req).await;

        let status = wait_for_finish(&jobs, &started.job_id).await;
        let JobStatus::Completed(summary) = status else {
            panic!("unexpected status {status:?}");
        };
        assert_eq!((summary.generated, summary.failed), (2, 0));
        assert!(summary.archive_name.starts_with("GreenValley_BulkIDCards_"));

        {
            let store = session.store.read().await;
            assert!(!store.is_busy());
            assert!(store
                .records()
                .iter()
                .all(|r| r.status == RecordStatus::Generated && r.generated_image.is_some()));
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/merge/download/{}", started.job_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let mut zip = ZipArchive::new(Cursor::new(body.to_vec())).unwrap();
        assert_eq!(zip.len(), 2);
        assert!(zip.by_name("AshaRao_R100.png").is_ok());
        assert!(zip.by_name("BenLee_R101.png").is_ok());
    }

    #[actix_web::test]
    async fn test_invalid_records_reject_the_job() {
        let session = session_from(b"Name,Roll No\nAsha,R100\n,R101\n").await;
        let jobs = jobs_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(test_config()))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/merge/start").to_request();
        let started: StartExportResponse = test::call_and_read_body_json(&app, req).await;

        match wait_for_finish(&jobs, &started.job_id).await {
            JobStatus::Rejected(validation) => {
                assert_eq!(validation.errors, vec!["Row 2: Missing name".to_string()])
            }
            other => panic!("unexpected status {other:?}"),
        }
        let store = session.store.read().await;
        assert!(!store.is_busy());
        assert!(store
            .records()
            .iter()
            .all(|r| r.status == RecordStatus::Pending));

        let req = test::TestRequest::get()
            .uri(&format!("/api/merge/download/{}", started.job_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_new_export_drops_previous_archive() {
        let session = session_from(b"Name,Roll No\nAsha Rao,R100\n").await;
        let jobs = jobs_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session.clone()))
                .app_data(web::Data::new(jobs.clone()))
                .app_data(web::Data::new(test_config()))
                .service(configure_routes()),
        )
        .await;

        let mut job_ids = Vec::new();
        for _ in 0..3 {
            let req = test::TestRequest::post().uri("/api/merge/start").to_request();
            let started: StartExportResponse = test::call_and_read_body_json(&app, req).await;
            assert!(matches!(
                wait_for_finish(&jobs, &started.job_id).await,
                JobStatus::Completed(_)
            ));
            job_ids.push(started.job_id);
        }
        assert_eq!(jobs.archives.read().await.len(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/merge/download/{}", job_ids[0]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/merge/download/{}", job_ids[2]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_second_start_while_busy_conflicts() {
        let session = session_from(b"Name\nAsha\n").await;
        session.store.write().await.begin_export().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(session))
                .app_data(web::Data::new(jobs_state()))
                .app_data(web::Data::new(test_config()))
                .service(configure_routes()),
        )
        .await;
        let req = test::TestRequest::post().uri("/api/merge/start").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
    }
}
