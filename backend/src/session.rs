use crate::bulk::store::RecordStore;
use common::model::design::DesignSettings;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The active bulk session: the record store and the design every card shares.
///
/// Created once in `main.rs` and shared as `web::Data`. The export job holds a clone
/// so it can report record status changes back into the store.
#[derive(Clone, Default)]
pub struct SessionState {
    pub store: Arc<RwLock<RecordStore>>,
    pub design: Arc<RwLock<DesignSettings>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}
