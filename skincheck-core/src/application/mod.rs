pub mod ingestion;
pub mod sync;

pub use ingestion::IngestionService;
pub use sync::{SyncOutcome, SyncService};
