pub mod requests;
pub mod scan;

pub use requests::{
    CreateScanRequest, SyncResultPayload, SyncScanItem, SyncScansRequest,
};
pub use scan::{
    NewScan, PageRequest, ScanPage, ScanRecord, ScanResult, DEFAULT_PER_PAGE,
    INLINE_IMAGE_MARKER, MAX_PER_PAGE,
};
