use std::{fmt, sync::Arc};

use skincheck_core::{
    application::{IngestionService, SyncService},
    classifier::ClassifierAdapter,
    database::ScanRepository,
};

use crate::auth::TokenVerifier;

/// Dependencies shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub scans: Arc<dyn ScanRepository>,
    pub ingestion: IngestionService,
    pub sync: SyncService,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        scans: Arc<dyn ScanRepository>,
        classifier: ClassifierAdapter,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            ingestion: IngestionService::new(Arc::clone(&scans), classifier),
            sync: SyncService::new(Arc::clone(&scans)),
            scans,
            token_verifier,
        }
    }
}
