use std::{fmt, sync::Arc};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::database::ports::scans::ScanRepository;
use crate::domain::{
    NewScan, ScanRecord, ScanResult, SyncResultPayload, SyncScanItem,
    SyncScansRequest,
};
use crate::error::{Result, ScanError};
use crate::timestamp::resolve_timestamp;

/// Result of a committed sync batch, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub synced_count: usize,
    pub scans: Vec<ScanRecord>,
}

/// Bulk upload of scans buffered on the device.
///
/// Client-supplied results are attached as-is; the classifier is never
/// consulted. The whole batch is validated before anything is written and
/// then committed through a single `create_batch` call.
#[derive(Clone)]
pub struct SyncService {
    scans: Arc<dyn ScanRepository>,
}

impl fmt::Debug for SyncService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncService").finish_non_exhaustive()
    }
}

impl SyncService {
    pub fn new(scans: Arc<dyn ScanRepository>) -> Self {
        Self { scans }
    }

    pub async fn sync(
        &self,
        user_id: Uuid,
        request: SyncScansRequest,
    ) -> Result<SyncOutcome> {
        if request.scans.is_empty() {
            return Ok(SyncOutcome {
                synced_count: 0,
                scans: Vec::new(),
            });
        }

        let now = Utc::now();
        let batch = request
            .scans
            .into_iter()
            .enumerate()
            .map(|(index, item)| prepare_item(user_id, index, item, now))
            .collect::<Result<Vec<_>>>()?;

        let scans = self.scans.create_batch(batch).await?;

        info!(user_id = %user_id, synced = scans.len(), "scan batch synced");
        Ok(SyncOutcome {
            synced_count: scans.len(),
            scans,
        })
    }
}

fn prepare_item(
    user_id: Uuid,
    index: usize,
    item: SyncScanItem,
    now: chrono::DateTime<Utc>,
) -> Result<NewScan> {
    let timestamp = resolve_timestamp(item.timestamp_str(), now);
    let image_path = match item.image_path {
        Some(path) if !path.trim().is_empty() => path,
        _ => {
            return Err(ScanError::Validation(format!(
                "Scan at index {index}: image path is required"
            )));
        }
    };

    let result = match item.result {
        Some(payload) if !payload.is_empty() => {
            Some(client_result(index, payload)?)
        }
        _ => None,
    };

    Ok(NewScan {
        user_id,
        image_path,
        timestamp,
        result,
    })
}

fn client_result(index: usize, payload: SyncResultPayload) -> Result<ScanResult> {
    let confidence = payload.confidence.unwrap_or(0.0);
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ScanError::Validation(format!(
            "Scan at index {index}: confidence must be between 0 and 1"
        )));
    }

    Ok(ScanResult {
        condition: payload.condition.unwrap_or_default(),
        confidence,
        recommendations: payload.recommendations.unwrap_or_default(),
    })
}
