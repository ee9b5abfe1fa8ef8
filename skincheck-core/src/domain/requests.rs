use serde::Deserialize;
use serde_json::Value;

/// Body of a single-scan submission.
///
/// The mobile client sends `imagePath`; `image_path` is accepted as well.
/// `timestamp` is kept as raw JSON so that any malformed value falls through
/// to the lenient timestamp policy instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateScanRequest {
    #[serde(default, rename = "imagePath", alias = "image_path")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl CreateScanRequest {
    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }
}

/// Body of `POST /scans/sync`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncScansRequest {
    #[serde(default)]
    pub scans: Vec<SyncScanItem>,
}

/// One buffered capture inside a sync batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncScanItem {
    #[serde(default, alias = "imagePath")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub result: Option<SyncResultPayload>,
}

impl SyncScanItem {
    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }
}

/// A classification computed on the device. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SyncResultPayload {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
}

impl SyncResultPayload {
    /// An empty `{}` result carries nothing worth attaching.
    pub fn is_empty(&self) -> bool {
        self.condition.is_none()
            && self.confidence.is_none()
            && self.recommendations.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_accepts_both_spellings() {
        let camel: CreateScanRequest =
            serde_json::from_value(json!({ "imagePath": "a.jpg" })).unwrap();
        let snake: CreateScanRequest =
            serde_json::from_value(json!({ "image_path": "b.jpg" })).unwrap();

        assert_eq!(camel.image_path.as_deref(), Some("a.jpg"));
        assert_eq!(snake.image_path.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn non_string_timestamp_is_not_rejected() {
        let request: CreateScanRequest = serde_json::from_value(json!({
            "imagePath": "a.jpg",
            "timestamp": 1700000000
        }))
        .unwrap();

        assert!(request.timestamp.is_some());
        assert_eq!(request.timestamp_str(), None);
    }

    #[test]
    fn sync_item_with_empty_result_object() {
        let item: SyncScanItem = serde_json::from_value(json!({
            "image_path": "c.jpg",
            "result": {}
        }))
        .unwrap();

        assert!(item.result.as_ref().is_some_and(SyncResultPayload::is_empty));
    }
}
