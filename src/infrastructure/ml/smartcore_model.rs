use crate::application::signal_classifier::ModelPolicy;
use crate::domain::analysis::{FeatureVector, ModelLabel};
use crate::domain::errors::ModelError;
use crate::domain::ports::RecommendationModel;
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub type ForestClassifier = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Random-forest classifier trained on `FEATURE_NAMES` order,
/// labels `0 = HOLD`, `1 = BUY`, `2 = SELL`.
pub struct SmartCoreModel {
    model: ForestClassifier,
}

impl SmartCoreModel {
    /// Loads a serde-JSON serialized classifier
    pub fn load(model_path: impl Into<PathBuf>) -> Result<Self, ModelError> {
        let model_path = model_path.into();
        let bytes = std::fs::read(&model_path).map_err(|e| {
            ModelError::Unavailable(format!("cannot read {}: {}", model_path.display(), e))
        })?;
        let model: ForestClassifier = serde_json::from_slice(&bytes).map_err(|e| {
            ModelError::Unavailable(format!(
                "cannot deserialize {}: {}",
                model_path.display(),
                e
            ))
        })?;

        info!("SmartCoreModel: Loaded model from {}", model_path.display());
        Ok(Self { model })
    }
}

impl RecommendationModel for SmartCoreModel {
    fn predict(&self, features: &FeatureVector) -> Result<ModelLabel, ModelError> {
        let input = DenseMatrix::from_2d_vec(&vec![features.to_vec()])
            .map_err(|e| ModelError::PredictionFailed(format!("matrix creation failed: {}", e)))?;

        let predictions = self
            .model
            .predict(&input)
            .map_err(|e| ModelError::PredictionFailed(e.to_string()))?;

        match predictions.first().copied() {
            Some(0) => Ok(ModelLabel::Hold),
            Some(1) => Ok(ModelLabel::Buy),
            Some(2) => Ok(ModelLabel::Sell),
            Some(other) => Err(ModelError::PredictionFailed(format!(
                "unknown label {}",
                other
            ))),
            None => Err(ModelError::PredictionFailed(
                "no prediction returned".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}

/// Resolves the configured model path into a recommendation policy.
/// A path that fails to load yields `Unavailable`, never an error.
pub fn load_policy(model_path: Option<&Path>) -> ModelPolicy {
    let Some(path) = model_path else {
        return ModelPolicy::RuleBased;
    };

    match SmartCoreModel::load(path) {
        Ok(model) => ModelPolicy::Model(Arc::new(model)),
        Err(e) => {
            warn!("SmartCoreModel: {}", e);
            ModelPolicy::Unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartcore::ensemble::random_forest_classifier::RandomForestClassifierParameters;

    fn uniform(value: f64) -> FeatureVector {
        FeatureVector {
            price: value,
            rsi: value,
            bb_upper: value,
            bb_lower: value,
            pct_change: value,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("marketwatch-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let path = temp_path("missing.json");
        assert!(matches!(
            SmartCoreModel::load(&path),
            Err(ModelError::Unavailable(_))
        ));
        assert!(matches!(
            load_policy(Some(path.as_path())),
            ModelPolicy::Unavailable(_)
        ));
        assert!(matches!(load_policy(None), ModelPolicy::RuleBased));
    }

    #[test]
    fn test_garbage_model_is_unavailable() {
        let path = temp_path("garbage.json");
        std::fs::write(&path, b"{ not a model").unwrap();
        assert!(matches!(
            SmartCoreModel::load(&path),
            Err(ModelError::Unavailable(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_trained_model_round_trips_through_disk() {
        // Every feature separates the classes: low -> BUY, mid -> HOLD, high -> SELL
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let jitter = i as f64 * 0.1;
            rows.push(uniform(10.0 + jitter).to_vec());
            labels.push(1);
            rows.push(uniform(50.0 + jitter).to_vec());
            labels.push(0);
            rows.push(uniform(90.0 + jitter).to_vec());
            labels.push(2);
        }
        let x = DenseMatrix::from_2d_vec(&rows).unwrap();
        let forest: ForestClassifier =
            RandomForestClassifier::fit(&x, &labels, RandomForestClassifierParameters::default())
                .unwrap();

        let path = temp_path("forest.json");
        std::fs::write(&path, serde_json::to_vec(&forest).unwrap()).unwrap();

        let model = SmartCoreModel::load(&path).unwrap();
        assert_eq!(model.predict(&uniform(11.0)), Ok(ModelLabel::Buy));
        assert_eq!(model.predict(&uniform(51.0)), Ok(ModelLabel::Hold));
        assert_eq!(model.predict(&uniform(91.0)), Ok(ModelLabel::Sell));

        let _ = std::fs::remove_file(&path);
    }
}
