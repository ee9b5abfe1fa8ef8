use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewScan, PageRequest, ScanPage, ScanRecord};
use crate::error::Result;

/// Persistence port for scan records.
///
/// Every read and delete is scoped by the owning user: a record that exists
/// but belongs to someone else is reported as `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanRepository: Send + Sync {
    /// Assign an identity and persist a single scan.
    async fn create(&self, scan: NewScan) -> Result<ScanRecord>;

    /// Persist every scan in one transaction. Either all records become
    /// visible or none do. Output order matches input order.
    async fn create_batch(&self, scans: Vec<NewScan>) -> Result<Vec<ScanRecord>>;

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<ScanRecord>;

    /// Newest first. Pages past the end are empty, not an error.
    async fn list(&self, user_id: Uuid, page: PageRequest) -> Result<ScanPage>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}
