//! Skin-lesion classification.
//!
//! The model itself is an external capability behind [`SkinModel`]. Callers
//! only ever talk to [`ClassifierAdapter`], which never fails: bare file
//! references get a "pending" sentinel and every failure along the
//! decode/preprocess/predict path is replaced by an "unavailable" sentinel.

mod preprocess;
mod random;

pub use preprocess::{InlineImage, ModelInput, MODEL_INPUT_SIZE};
pub use random::{recommendations_for, RandomSkinModel, CONDITIONS};

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{scan::is_inline_image, ScanResult};

pub const ANALYSIS_PENDING: &str = "Analysis Pending";
pub const ANALYSIS_UNAVAILABLE: &str = "Analysis Unavailable";
pub const CONSULT_DERMATOLOGIST: &str =
    "Please consult a dermatologist for proper diagnosis";

/// Reasons a classification attempt did not produce a usable result.
///
/// Contained by [`ClassifierAdapter`]; never surfaced to API clients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationFailure {
    #[error("malformed inline image: {0}")]
    MalformedPayload(String),

    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("model inference failed: {0}")]
    Model(String),

    #[error("model reported confidence {0} outside [0, 1]")]
    InvalidConfidence(f64),
}

/// A classification model. Implementations may block; the adapter runs them
/// on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait SkinModel: Send + Sync {
    fn predict(
        &self,
        input: &ModelInput,
    ) -> Result<ScanResult, ClassificationFailure>;
}

#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Arc<dyn SkinModel>,
}

impl fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierAdapter").finish_non_exhaustive()
    }
}

impl ClassifierAdapter {
    pub fn new(model: Arc<dyn SkinModel>) -> Self {
        Self { model }
    }

    /// Classify an image payload. Always returns a result.
    pub fn classify(&self, payload: &str) -> ScanResult {
        if !is_inline_image(payload) {
            debug!("payload is not an inline image; classification deferred");
            return pending_result();
        }

        match self.try_classify(payload) {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "classification failed; using fallback result");
                unavailable_result()
            }
        }
    }

    /// Same as [`classify`](Self::classify) but runs decoding and inference
    /// on tokio's blocking pool. A panicking model yields the fallback result.
    pub async fn classify_blocking(&self, payload: String) -> ScanResult {
        let adapter = self.clone();
        match tokio::task::spawn_blocking(move || adapter.classify(&payload))
            .await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "classification task aborted; using fallback result");
                unavailable_result()
            }
        }
    }

    fn try_classify(
        &self,
        payload: &str,
    ) -> Result<ScanResult, ClassificationFailure> {
        let image = InlineImage::parse(payload)?;
        let input = image.preprocess()?;
        let result = self.model.predict(&input)?;

        if !result.confidence.is_finite()
            || !(0.0..=1.0).contains(&result.confidence)
        {
            return Err(ClassificationFailure::InvalidConfidence(
                result.confidence,
            ));
        }

        Ok(result)
    }
}

/// Sentinel for payloads that cannot be classified server-side.
pub fn pending_result() -> ScanResult {
    sentinel(ANALYSIS_PENDING)
}

/// Sentinel for classification attempts that failed.
pub fn unavailable_result() -> ScanResult {
    sentinel(ANALYSIS_UNAVAILABLE)
}

fn sentinel(condition: &str) -> ScanResult {
    ScanResult {
        condition: condition.to_string(),
        confidence: 0.0,
        recommendations: vec![CONSULT_DERMATOLOGIST.to_string()],
    }
}
