use std::collections::HashMap;

use crate::catalog::Catalog;

use super::extractor::SymptomExtractor;
use super::types::FeatureVector;

/// Signal assigned to a symptom that is only mentioned in text.
/// Weaker than an explicit numeric report.
pub const TEXT_DETECTION_SIGNAL: f64 = 0.6;

/// Build the catalog-aligned feature vector for one request.
///
/// Text detections seed their slots at [`TEXT_DETECTION_SIGNAL`]; caller
/// intensities (clamped to [0, 1]) can only raise a slot, never lower it.
/// Unknown intensity keys are ignored.
pub fn build_features(
    catalog: &Catalog,
    extractor: &SymptomExtractor,
    text: &str,
    intensity: &HashMap<String, f64>,
) -> (FeatureVector, Vec<String>) {
    let detected = extractor.extract(text);
    let mut features = FeatureVector::zeros(catalog.symptom_count());

    for symptom in &detected {
        if let Some(index) = catalog.symptom_index(symptom) {
            features.raise(index, TEXT_DETECTION_SIGNAL);
        }
    }

    for (symptom, score) in intensity {
        if let Some(index) = catalog.symptom_index(symptom) {
            features.raise(index, *score);
        }
    }

    tracing::debug!(
        detected = detected.len(),
        reported = intensity.len(),
        "Feature vector built"
    );
    (features, detected)
}
