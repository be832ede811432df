//! Attribution Engine: integrated-gradients style attribution against a
//! zero baseline.
//!
//! The gradient is a fixed, label-independent proxy: `1 / (S + ε)` on every
//! slot whose interpolated value is positive. It never consults the model,
//! so the same attribution comes back whichever scorer tier answered.

use crate::catalog::Catalog;

use super::types::{round4, AttributionItem, FeatureVector};

/// Interpolation steps along the baseline → input path.
pub const IG_STEPS: usize = 30;

/// Contribution above which an undetected symptom is still reported.
pub const CONTRIBUTION_THRESHOLD: f64 = 0.01;

/// Maximum attribution items returned.
pub const MAX_ITEMS: usize = 8;

const EPSILON: f64 = 1e-6;

/// Raw per-slot attributions, same order as `features`.
pub fn integrated_gradients(features: &FeatureVector) -> Vec<f64> {
    let x = features.as_slice();
    let grad = 1.0 / (x.len() as f64 + EPSILON);
    let mut accumulated = vec![0.0; x.len()];

    for step in 1..=IG_STEPS {
        let alpha = step as f64 / IG_STEPS as f64;
        for (acc, value) in accumulated.iter_mut().zip(x) {
            // baseline is zero, so the interpolated point is alpha * x
            if alpha * value > 0.0 {
                *acc += grad;
            }
        }
    }

    x.iter()
        .zip(&accumulated)
        .map(|(value, acc)| value * acc / IG_STEPS as f64)
        .collect()
}

/// Ranked attribution list: detected symptoms plus anything above the
/// threshold, sorted by contribution (descending), at most [`MAX_ITEMS`].
pub fn explain(catalog: &Catalog, features: &FeatureVector, detected: &[String]) -> Vec<AttributionItem> {
    let attributions = integrated_gradients(features);

    let mut items: Vec<AttributionItem> = catalog
        .symptoms()
        .iter()
        .zip(&attributions)
        .filter(|(symptom, value)| {
            detected.iter().any(|d| d == *symptom) || **value > CONTRIBUTION_THRESHOLD
        })
        .map(|(symptom, value)| AttributionItem {
            symptom: symptom.clone(),
            contribution: round4(*value),
        })
        .collect();

    items.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    items.truncate(MAX_ITEMS);
    items
}
