use std::sync::Mutex;

use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};

use super::{ClassificationFailure, ModelInput, SkinModel};
use crate::domain::ScanResult;

/// Labels the stand-in model chooses from, with their recommendations.
pub const CONDITIONS: &[(&str, &[&str])] = &[
    (
        "Benign Mole",
        &[
            "Monitor for changes in size, shape, or color",
            "Annual dermatologist check-up recommended",
            "Protect from sun exposure",
        ],
    ),
    (
        "Normal Skin",
        &[
            "Continue regular self-examinations",
            "Use sunscreen daily",
            "Maintain healthy skincare routine",
        ],
    ),
    (
        "Freckle",
        &[
            "Protect from sun exposure",
            "Monthly self-check recommended",
            "No immediate action needed",
        ],
    ),
    (
        "Age Spot",
        &[
            "No immediate action needed",
            "Regular dermatologist visits recommended",
            "Use sunscreen to prevent new spots",
        ],
    ),
    (
        "Seborrheic Keratosis",
        &[
            "Schedule dermatologist appointment for confirmation",
            "Monitor for growth or changes",
            "Usually benign but should be examined",
        ],
    ),
    (
        "Actinic Keratosis",
        &[
            "Schedule dermatologist appointment immediately",
            "Avoid sun exposure",
            "May require treatment to prevent progression",
        ],
    ),
    (
        "Dermatofibroma",
        &[
            "Generally benign, monitor for changes",
            "Consult dermatologist if concerned",
            "No urgent treatment typically needed",
        ],
    ),
];

const MIN_CONFIDENCE: f64 = 0.75;
const MAX_CONFIDENCE: f64 = 0.95;

/// Recommendations for a label, or a generic referral for unknown labels.
pub fn recommendations_for(condition: &str) -> Vec<String> {
    CONDITIONS
        .iter()
        .find(|(label, _)| *label == condition)
        .map(|(_, recs)| recs.iter().map(|r| r.to_string()).collect())
        .unwrap_or_else(|| vec!["Consult a dermatologist".to_string()])
}

/// Stand-in until a trained model is wired in: picks a label at random and a
/// confidence in `[0.75, 0.95]`, ignoring the pixels.
#[derive(Debug)]
pub struct RandomSkinModel {
    rng: Mutex<StdRng>,
}

impl Default for RandomSkinModel {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSkinModel {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic sequence for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SkinModel for RandomSkinModel {
    fn predict(
        &self,
        _input: &ModelInput,
    ) -> Result<ScanResult, ClassificationFailure> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ClassificationFailure::Model("rng lock poisoned".into()))?;

        let (condition, _) = CONDITIONS.choose(&mut *rng).ok_or_else(|| {
            ClassificationFailure::Model("no labels configured".into())
        })?;
        let confidence = rng.random_range(MIN_CONFIDENCE..=MAX_CONFIDENCE);

        Ok(ScanResult {
            condition: condition.to_string(),
            confidence,
            recommendations: recommendations_for(condition),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::MODEL_INPUT_SIZE;

    fn blank_input() -> ModelInput {
        ModelInput {
            width: MODEL_INPUT_SIZE,
            height: MODEL_INPUT_SIZE,
            data: vec![0.0; (MODEL_INPUT_SIZE * MODEL_INPUT_SIZE * 3) as usize],
        }
    }

    #[test]
    fn predictions_stay_within_label_set_and_range() {
        let model = RandomSkinModel::seeded(7);
        for _ in 0..200 {
            let result = model.predict(&blank_input()).unwrap();
            assert!(CONDITIONS.iter().any(|(label, _)| *label == result.condition));
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&result.confidence));
            assert_eq!(result.recommendations.len(), 3);
        }
    }

    #[test]
    fn seeded_models_agree() {
        let a = RandomSkinModel::seeded(42);
        let b = RandomSkinModel::seeded(42);
        for _ in 0..10 {
            assert_eq!(
                a.predict(&blank_input()).unwrap(),
                b.predict(&blank_input()).unwrap()
            );
        }
    }

    #[test]
    fn unknown_label_gets_generic_referral() {
        assert_eq!(
            recommendations_for("Something Else"),
            vec!["Consult a dermatologist".to_string()]
        );
        assert_eq!(recommendations_for("Freckle")[2], "No immediate action needed");
    }
}
