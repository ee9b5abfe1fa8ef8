use std::{fmt, sync::Arc};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::classifier::ClassifierAdapter;
use crate::database::ports::scans::ScanRepository;
use crate::domain::{scan::is_inline_image, CreateScanRequest, NewScan, ScanRecord};
use crate::error::{Result, ScanError};
use crate::timestamp::resolve_timestamp;

/// Single-scan submission: validate, resolve the capture time, classify
/// inline images, persist.
#[derive(Clone)]
pub struct IngestionService {
    scans: Arc<dyn ScanRepository>,
    classifier: ClassifierAdapter,
}

impl fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionService").finish_non_exhaustive()
    }
}

impl IngestionService {
    pub fn new(scans: Arc<dyn ScanRepository>, classifier: ClassifierAdapter) -> Self {
        Self { scans, classifier }
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        request: CreateScanRequest,
    ) -> Result<ScanRecord> {
        let timestamp = resolve_timestamp(request.timestamp_str(), Utc::now());
        let image_path = match request.image_path {
            Some(path) if !path.trim().is_empty() => path,
            _ => {
                return Err(ScanError::Validation(
                    "Image path is required".to_string(),
                ));
            }
        };

        let result = if is_inline_image(&image_path) {
            Some(self.classifier.classify_blocking(image_path.clone()).await)
        } else {
            None
        };

        let record = self
            .scans
            .create(NewScan {
                user_id,
                image_path,
                timestamp,
                result,
            })
            .await?;

        info!(
            scan_id = %record.id,
            user_id = %user_id,
            classified = record.result.is_some(),
            "scan created"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{
        test_images::png_data_uri, RandomSkinModel, ANALYSIS_UNAVAILABLE,
    };
    use crate::database::infrastructure::memory::InMemoryScanRepository;
    use crate::database::ports::scans::MockScanRepository;
    use crate::domain::PageRequest;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn classifier() -> ClassifierAdapter {
        ClassifierAdapter::new(Arc::new(RandomSkinModel::seeded(11)))
    }

    fn request(image_path: Option<&str>, timestamp: Option<&str>) -> CreateScanRequest {
        CreateScanRequest {
            image_path: image_path.map(str::to_string),
            timestamp: timestamp.map(|t| json!(t)),
        }
    }

    #[tokio::test]
    async fn missing_or_blank_path_is_rejected_without_writing() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo.clone(), classifier());
        let user = Uuid::new_v4();

        for bad in [None, Some(""), Some("   ")] {
            let err = service.submit(user, request(bad, None)).await.unwrap_err();
            assert!(matches!(err, ScanError::Validation(ref msg) if msg == "Image path is required"));
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn file_reference_is_stored_without_result() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo.clone(), classifier());
        let user = Uuid::new_v4();

        let record = service
            .submit(user, request(Some("scans/left-arm.jpg"), Some("2024-05-04T10:00:00Z")))
            .await
            .unwrap();

        assert!(record.result.is_none());
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap()
        );
        assert_eq!(repo.get(record.id, user).await.unwrap(), record);
    }

    #[tokio::test]
    async fn inline_image_is_classified() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo, classifier());

        let record = service
            .submit(Uuid::new_v4(), request(Some(&png_data_uri(16, 16)), None))
            .await
            .unwrap();

        let result = record.result.expect("classified");
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(!result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn broken_inline_image_still_succeeds_with_fallback() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo, classifier());

        let record = service
            .submit(
                Uuid::new_v4(),
                request(Some("data:image/jpeg;base64,@@@"), None),
            )
            .await
            .unwrap();

        let result = record.result.expect("fallback result attached");
        assert_eq!(result.condition, ANALYSIS_UNAVAILABLE);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn unparseable_timestamp_defaults_to_now() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo, classifier());

        let before = Utc::now() - Duration::seconds(1);
        let record = service
            .submit(Uuid::new_v4(), request(Some("a.jpg"), Some("not a date")))
            .await
            .unwrap();
        let after = Utc::now() + Duration::seconds(1);

        assert!(record.timestamp >= before && record.timestamp <= after);
    }

    #[tokio::test]
    async fn persistence_failure_is_fatal() {
        let mut repo = MockScanRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(ScanError::Persistence("disk full".into())));
        let service = IngestionService::new(Arc::new(repo), classifier());

        let err = service
            .submit(Uuid::new_v4(), request(Some("a.jpg"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Persistence(_)));
    }

    #[tokio::test]
    async fn created_scans_are_listed_for_their_owner_only() {
        let repo = Arc::new(InMemoryScanRepository::new());
        let service = IngestionService::new(repo.clone(), classifier());
        let owner = Uuid::new_v4();

        service.submit(owner, request(Some("a.jpg"), None)).await.unwrap();

        let mine = repo.list(owner, PageRequest::default()).await.unwrap();
        let theirs = repo.list(Uuid::new_v4(), PageRequest::default()).await.unwrap();
        assert_eq!(mine.total, 1);
        assert_eq!(theirs.total, 0);
    }
}
