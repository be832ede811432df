//! Classifier capability used by the trained scorer tiers.
//!
//! How a classifier is trained is outside this crate. The router only needs
//! `predict_proba` over the classifier's own label set and a readiness flag.
//! `SoftmaxClassifier` is the bundled implementation: a linear model exported
//! to JSON.

use std::path::Path;

use serde::Deserialize;

use crate::catalog::Catalog;

use super::types::{ClassifierError, FeatureVector};

pub trait Classifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Labels in the order `predict_proba` reports them.
    fn labels(&self) -> &[String];

    /// Whether the classifier finished loading and may be queried.
    fn is_ready(&self) -> bool {
        true
    }

    /// One probability per label, same order as [`Classifier::labels`].
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;
}

/// Exported linear model: `softmax(weights · x + bias)`.
#[derive(Debug, Clone, Deserialize)]
pub struct SoftmaxClassifier {
    #[serde(default = "default_model_name")]
    name: String,
    feature_columns: Vec<String>,
    labels: Vec<String>,
    /// `weights[label][feature]`.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

fn default_model_name() -> String {
    "softmax".to_string()
}

impl SoftmaxClassifier {
    /// Load and verify a model export.
    ///
    /// The model's feature columns must equal the catalog symptom order, and
    /// at least one of its labels must be a catalog disease.
    pub fn load(path: &Path, catalog: &Catalog) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::ModelLoad(path.display().to_string(), e.to_string()))?;
        let model: Self = serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::ModelParse(path.display().to_string(), e.to_string()))?;
        model.verify(catalog)?;

        tracing::info!(
            model = %model.name,
            labels = model.labels.len(),
            path = %path.display(),
            "Classifier loaded"
        );
        Ok(model)
    }

    fn verify(&self, catalog: &Catalog) -> Result<(), ClassifierError> {
        if self.labels.is_empty() {
            return Err(ClassifierError::InvalidStructure("no labels".into()));
        }
        if self.weights.len() != self.labels.len() || self.bias.len() != self.labels.len() {
            return Err(ClassifierError::InvalidStructure(format!(
                "{} labels, {} weight rows, {} biases",
                self.labels.len(),
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some(row) = self
            .weights
            .iter()
            .find(|row| row.len() != self.feature_columns.len())
        {
            return Err(ClassifierError::InvalidStructure(format!(
                "weight row has {} entries for {} features",
                row.len(),
                self.feature_columns.len()
            )));
        }
        if self.feature_columns.as_slice() != catalog.symptoms() {
            return Err(ClassifierError::FeatureMismatch);
        }
        if !self.labels.iter().any(|label| catalog.is_disease(label)) {
            return Err(ClassifierError::LabelMismatch);
        }
        let outside = self
            .labels
            .iter()
            .filter(|label| !catalog.is_disease(label))
            .count();
        if outside > 0 {
            tracing::warn!(
                model = %self.name,
                outside,
                "Model labels outside the disease catalog will be dropped"
            );
        }
        Ok(())
    }
}

impl Classifier for SoftmaxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        if features.len() != self.feature_columns.len() {
            return Err(ClassifierError::FeatureLength {
                expected: self.feature_columns.len(),
                got: features.len(),
            });
        }

        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                row.iter()
                    .zip(features.as_slice())
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + b
            })
            .collect();

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ClassifierError::MalformedOutput("softmax overflow".into()));
        }
        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_json(columns: &[String], labels: &[&str], hot: usize) -> String {
        let weights: Vec<Vec<f64>> = labels
            .iter()
            .enumerate()
            .map(|(i, _)| {
                (0..columns.len())
                    .map(|j| if i == 0 && j == hot { 4.0 } else { 0.0 })
                    .collect()
            })
            .collect();
        serde_json::json!({
            "name": "test-model",
            "feature_columns": columns,
            "labels": labels,
            "weights": weights,
            "bias": vec![0.0; labels.len()],
        })
        .to_string()
    }

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("model.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_and_predicts_distribution() {
        let catalog = Catalog::builtin();
        let fever = catalog.symptom_index("fever").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, &model_json(catalog.symptoms(), &["Flu", "Allergy"], fever));

        let model = SoftmaxClassifier::load(&path, &catalog).unwrap();
        assert_eq!(model.name(), "test-model");
        assert!(model.is_ready());

        let mut features = FeatureVector::zeros(catalog.symptom_count());
        features.raise(fever, 1.0);
        let probs = model.predict_proba(&features).unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn zero_features_give_uniform() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, &model_json(
            catalog.symptoms(),
            &["Flu", "Dengue", "Malaria", "Typhoid"],
            0,
        ));
        let model = SoftmaxClassifier::load(&path, &catalog).unwrap();
        let probs = model
            .predict_proba(&FeatureVector::zeros(catalog.symptom_count()))
            .unwrap();
        assert!(probs.iter().all(|p| (p - 0.25).abs() < 1e-12));
    }

    #[test]
    fn rejects_feature_column_mismatch() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let columns = vec!["fever".to_string(), "cough".to_string()];
        let path = write(&dir, &model_json(&columns, &["Flu"], 0));
        let err = SoftmaxClassifier::load(&path, &catalog).unwrap_err();
        assert!(matches!(err, ClassifierError::FeatureMismatch));
    }

    #[test]
    fn rejects_labels_outside_catalog() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            &model_json(catalog.symptoms(), &["Influenza", "Type 2 Diabetes Alert"], 0),
        );
        let err = SoftmaxClassifier::load(&path, &catalog).unwrap_err();
        assert!(matches!(err, ClassifierError::LabelMismatch));
    }

    #[test]
    fn partial_label_overlap_loads() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, &model_json(catalog.symptoms(), &["Influenza", "Flu"], 0));
        let model = SoftmaxClassifier::load(&path, &catalog).unwrap();
        assert_eq!(model.labels().len(), 2);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "feature_columns": catalog.symptoms(),
            "labels": ["Flu", "Allergy"],
            "weights": [vec![0.0; catalog.symptom_count()]],
            "bias": [0.0, 0.0],
        })
        .to_string();
        let err = SoftmaxClassifier::load(&write(&dir, &body), &catalog).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidStructure(_)));
    }

    #[test]
    fn missing_and_corrupt_files() {
        let catalog = Catalog::builtin();
        let err = SoftmaxClassifier::load(Path::new("/nonexistent/model.json"), &catalog)
            .unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(..)));

        let dir = tempfile::tempdir().unwrap();
        let err = SoftmaxClassifier::load(&write(&dir, "[1, 2"), &catalog).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelParse(..)));
    }

    #[test]
    fn wrong_feature_length_is_error() {
        let catalog = Catalog::builtin();
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, &model_json(catalog.symptoms(), &["Flu"], 0));
        let model = SoftmaxClassifier::load(&path, &catalog).unwrap();
        let err = model.predict_proba(&FeatureVector::zeros(3)).unwrap_err();
        assert!(matches!(err, ClassifierError::FeatureLength { expected: 38, got: 3 }));
    }
}
