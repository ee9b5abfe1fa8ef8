use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix that distinguishes an inline data-URI image from a file reference.
pub const INLINE_IMAGE_MARKER: &str = "data:image";

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Outcome of a classification, either computed server-side or supplied by
/// the client during sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub condition: String,
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

/// A persisted skin-image assessment.
///
/// Records are immutable once created; `result` is attached at creation time
/// or never.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_path: String,
    pub timestamp: DateTime<Utc>,
    pub result: Option<ScanResult>,
}

pub(crate) fn is_inline_image(image_path: &str) -> bool {
    image_path.starts_with(INLINE_IMAGE_MARKER)
}

/// A validated scan waiting for the store to assign its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    pub user_id: Uuid,
    pub image_path: String,
    pub timestamp: DateTime<Utc>,
    pub result: Option<ScanResult>,
}

impl NewScan {
    pub fn into_record(self, id: Uuid) -> ScanRecord {
        ScanRecord {
            id,
            user_id: self.user_id,
            image_path: self.image_path,
            timestamp: self.timestamp,
            result: self.result,
        }
    }
}

/// Normalized pagination window.
///
/// Pages are 1-based. Values below 1 fall back to the defaults and
/// `per_page` never exceeds [`MAX_PER_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = match page {
            Some(value) if value >= 1 => {
                u32::try_from(value).unwrap_or(u32::MAX)
            }
            _ => 1,
        };
        let per_page = match per_page {
            Some(value) if value >= 1 => {
                value.min(i64::from(MAX_PER_PAGE)) as u32
            }
            _ => DEFAULT_PER_PAGE,
        };
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of records to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// One page of a user's scans, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    pub items: Vec<ScanRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl ScanPage {
    pub fn new(items: Vec<ScanRecord>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page());
        Self {
            items,
            total,
            page: request.page(),
            per_page: request.per_page(),
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_defaults_when_unspecified() {
        let request = PageRequest::new(None, None);
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_request_clamps_per_page() {
        let request = PageRequest::new(Some(2), Some(500));
        assert_eq!(request.per_page(), MAX_PER_PAGE);
        assert_eq!(request.offset(), 100);
    }

    #[test]
    fn page_request_replaces_non_positive_values() {
        let request = PageRequest::new(Some(0), Some(-5));
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn scan_page_counts_partial_last_page() {
        let page = ScanPage::new(Vec::new(), 41, PageRequest::new(Some(9), Some(20)));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 9);
        assert!(page.items.is_empty());

        let empty = ScanPage::new(Vec::new(), 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn inline_marker_detection() {
        assert!(is_inline_image("data:image/png;base64,AAAA"));
        assert!(!is_inline_image("/var/mobile/scan-01.jpg"));
        assert!(!is_inline_image("DATA:IMAGE/png;base64,AAAA"));
    }
}
