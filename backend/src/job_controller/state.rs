//! Manages the state of long-running, asynchronous export jobs.
//!
//! An export runs outside the request/response cycle (see
//! `services/merge/start.rs`). Its progress is tracked here:
//! - `JobsState`: a clonable, thread-safe handle injected into the Actix app. It
//!   holds the status of every job and the finished archives awaiting download.
//! - `JobUpdate`: a status change sent by a job to the central updater.
//! - `start_job_updater`: a long-running task that drains the update channel into
//!   the shared job map.

use crate::bulk::archive::ExportArchive;
use common::jobs::JobStatus;
use log::debug;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

#[derive(Clone)]
pub struct JobsState {
    /// Job id to its current status. Written only by `start_job_updater` once a job
    /// is registered.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Archive of the most recent completed job, served by
    /// `/api/merge/download/{job_id}`. At most one entry is kept.
    pub archives: Arc<RwLock<HashMap<String, ExportArchive>>>,

    /// Jobs push `JobUpdate`s here instead of writing the map themselves.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A status update for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            archives: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    /// Create a job in `Pending` and return its id.
    pub async fn register(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Keep `archive` as the only downloadable archive, dropping any older one.
    pub async fn store_archive(&self, job_id: &str, archive: ExportArchive) {
        let mut archives = self.archives.write().await;
        archives.clear();
        archives.insert(job_id.to_string(), archive);
    }

    /// Drop every stored archive. Called when a new export starts.
    pub async fn discard_archives(&self) {
        let mut archives = self.archives.write().await;
        if !archives.is_empty() {
            debug!("Dropping {} stored archive(s)", archives.len());
            archives.clear();
        }
    }

    /// Queue an update for the central updater. A closed channel is logged and
    /// otherwise ignored.
    pub async fn send(&self, job_id: &str, status: JobStatus) {
        let update = JobUpdate {
            job_id: job_id.to_string(),
            status,
        };
        if let Err(e) = self.tx.send(update).await {
            debug!("Job updater is gone, dropping update for {}", e.0.job_id);
        }
    }
}

/// Drain `rx` into the shared job map.
///
/// A job that already reached a final status keeps it; late updates for it are
/// dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if jobs.get(&update.job_id).is_some_and(JobStatus::is_finished) {
            debug!("Ignoring update for finished job {}", update.job_id);
            continue;
        }
        jobs.insert(update.job_id, update.status);
    }
}
