use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Clamp into [0, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round to 4 decimal digits for presentation.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ---------------------------------------------------------------------------
// FeatureVector
// ---------------------------------------------------------------------------

/// Per-request symptom signal, index-aligned to the catalog symptom order.
/// Every entry lies in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    /// Build from raw values, clamping each into [0, 1].
    #[cfg(test)]
    pub(crate) fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().map(clamp_unit).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Raise slot `index` to `value` (clamped). Never lowers it.
    pub fn raise(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = slot.max(clamp_unit(value));
        }
    }
}

// ---------------------------------------------------------------------------
// LabelDistribution
// ---------------------------------------------------------------------------

/// (label, probability) pairs in scorer label order, summing to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDistribution {
    entries: Vec<(String, f64)>,
}

impl LabelDistribution {
    /// Validate raw scorer output and normalize it to a distribution.
    pub fn from_scores(labels: &[String], scores: &[f64]) -> Result<Self, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::MalformedOutput("no labels".into()));
        }
        if labels.len() != scores.len() {
            return Err(ClassifierError::MalformedOutput(format!(
                "{} scores for {} labels",
                scores.len(),
                labels.len()
            )));
        }
        if let Some(bad) = scores.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(ClassifierError::MalformedOutput(format!(
                "invalid probability {bad}"
            )));
        }
        let total: f64 = scores.iter().sum();
        if total <= 0.0 {
            return Err(ClassifierError::MalformedOutput("zero probability mass".into()));
        }

        let entries = labels
            .iter()
            .zip(scores)
            .map(|(label, score)| (label.clone(), score / total))
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn probability(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    /// Keep only labels listed in `catalog`, reordered to catalog order and
    /// renormalized. Errors if no probability mass lands on the catalog.
    pub fn restrict_to(&self, catalog: &[String]) -> Result<Self, ClassifierError> {
        let (labels, scores): (Vec<String>, Vec<f64>) = catalog
            .iter()
            .filter_map(|label| self.probability(label).map(|p| (label.clone(), p)))
            .unzip();
        if labels.is_empty() {
            return Err(ClassifierError::MalformedOutput(
                "no labels in the disease catalog".into(),
            ));
        }
        Self::from_scores(&labels, &scores)
    }

    /// Sorted by probability descending. Stable, so ties keep label order.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Which scorer tier produced a prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScorerTier {
    Primary,
    Secondary,
    Heuristic,
}

impl ScorerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedLabel {
    pub disease: String,
    /// Rounded to 4 decimal digits.
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Unrounded probability of `label`.
    pub confidence: f64,
    pub top_k: Vec<RankedLabel>,
    pub scorer: ScorerTier,
}

// ---------------------------------------------------------------------------
// Attribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributionItem {
    pub symptom: String,
    pub contribution: f64,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Whether follow-up guidance should be escalated.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Pattern compilation failed for {symptom}: {source}")]
    Pattern {
        symptom: String,
        #[source]
        source: regex::Error,
    },
}

/// Classifier errors. The router absorbs all of these by demoting a tier.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model load failed ({0}): {1}")]
    ModelLoad(String, String),

    #[error("Model parse failed ({0}): {1}")]
    ModelParse(String, String),

    #[error("Model structure invalid: {0}")]
    InvalidStructure(String),

    #[error("Model feature columns do not match the symptom catalog")]
    FeatureMismatch,

    #[error("Model labels do not overlap the disease catalog")]
    LabelMismatch,

    #[error("Feature vector has {got} entries, model expects {expected}")]
    FeatureLength { expected: usize, got: usize },

    #[error("Classifier returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Classifier not ready: {0}")]
    NotReady(String),
}

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Input text is required")]
    EmptyText,

    #[error("Input text must be at least {min} characters")]
    TextTooShort { min: usize },

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clamp_unit_bounds_and_nan() {
        assert_eq!(clamp_unit(10.0), 1.0);
        assert_eq!(clamp_unit(-5.0), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(f64::INFINITY), 1.0);
    }

    #[test]
    fn round4_rounds_half_away() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
    }

    #[test]
    fn feature_raise_never_lowers() {
        let mut v = FeatureVector::zeros(3);
        v.raise(1, 0.6);
        v.raise(1, 0.2);
        assert_eq!(v.get(1), Some(0.6));
        v.raise(1, 5.0);
        assert_eq!(v.get(1), Some(1.0));
        v.raise(99, 1.0);
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn distribution_normalizes() {
        let d = LabelDistribution::from_scores(&labels(&["a", "b"]), &[1.0, 3.0]).unwrap();
        assert_eq!(d.probability("a"), Some(0.25));
        assert_eq!(d.probability("b"), Some(0.75));
    }

    #[test]
    fn distribution_rejects_bad_output() {
        let l = labels(&["a", "b"]);
        assert!(LabelDistribution::from_scores(&l, &[1.0]).is_err());
        assert!(LabelDistribution::from_scores(&l, &[0.0, 0.0]).is_err());
        assert!(LabelDistribution::from_scores(&l, &[-0.1, 1.0]).is_err());
        assert!(LabelDistribution::from_scores(&l, &[f64::NAN, 1.0]).is_err());
        assert!(LabelDistribution::from_scores(&[], &[]).is_err());
    }

    #[test]
    fn ranked_ties_keep_label_order() {
        let d = LabelDistribution::from_scores(&labels(&["x", "y", "z"]), &[1.0, 2.0, 2.0])
            .unwrap();
        let ranked = d.ranked();
        assert_eq!(ranked[0].0, "y");
        assert_eq!(ranked[1].0, "z");
        assert_eq!(ranked[2].0, "x");
    }

    #[test]
    fn restrict_reorders_to_catalog_and_renormalizes() {
        let d = LabelDistribution::from_scores(
            &labels(&["Influenza", "Typhoid", "Allergy"]),
            &[0.5, 0.25, 0.25],
        )
        .unwrap();
        let r = d.restrict_to(&labels(&["Allergy", "Flu", "Typhoid"])).unwrap();
        let names: Vec<&str> = r.entries().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(names, vec!["Allergy", "Typhoid"]);
        assert_eq!(r.probability("Allergy"), Some(0.5));
        assert_eq!(r.probability("Influenza"), None);
    }

    #[test]
    fn restrict_without_catalog_labels_is_error() {
        let d = LabelDistribution::from_scores(&labels(&["Influenza"]), &[1.0]).unwrap();
        assert!(matches!(
            d.restrict_to(&labels(&["Flu"])),
            Err(ClassifierError::MalformedOutput(_))
        ));
        let zero = LabelDistribution::from_scores(&labels(&["Flu", "X"]), &[0.0, 1.0]).unwrap();
        assert!(zero.restrict_to(&labels(&["Flu"])).is_err());
    }

    #[test]
    fn risk_level_serializes_as_name() {
        let json = serde_json::to_string(&RiskLevel::Moderate).unwrap();
        assert_eq!(json, "\"Moderate\"");
        assert!(RiskLevel::Critical.is_elevated());
        assert!(!RiskLevel::Moderate.is_elevated());
    }
}
