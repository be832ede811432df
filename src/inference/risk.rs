//! Risk Scorer: fuses disease severity, model confidence, reported
//! intensity and symptom burden into a bounded score and tier.

use std::collections::HashMap;

use crate::catalog::Catalog;

use super::types::{clamp_unit, round4, RiskAssessment, RiskLevel};

/// Baseline used for labels the catalog has no severity for.
pub const UNKNOWN_LABEL_BASELINE: f64 = 0.3;

/// Average intensity assumed when the caller reports none.
pub const DEFAULT_INTENSITY: f64 = 0.4;

/// Detected-symptom count at which burden saturates.
pub const BURDEN_SATURATION: f64 = 8.0;

const SEVERITY_WEIGHT: f64 = 0.45;
const CONFIDENCE_WEIGHT: f64 = 0.35;
const SYMPTOM_WEIGHT: f64 = 0.20;

/// Severity baseline in [0, 1]: catalog severity / 10, or 0.3 if unknown.
pub fn baseline_severity(catalog: &Catalog, label: &str) -> f64 {
    catalog
        .severity(label)
        .map(|s| clamp_unit(f64::from(s) / 10.0))
        .unwrap_or(UNKNOWN_LABEL_BASELINE)
}

/// Mean of clamped intensities over catalog symptoms, or the default.
pub fn average_intensity(catalog: &Catalog, intensity: &HashMap<String, f64>) -> f64 {
    let counted: Vec<f64> = intensity
        .iter()
        .filter(|(symptom, _)| catalog.is_symptom(symptom))
        .map(|(_, value)| clamp_unit(*value))
        .collect();
    if counted.is_empty() {
        DEFAULT_INTENSITY
    } else {
        counted.iter().sum::<f64>() / counted.len() as f64
    }
}

pub fn risk_level(score: f64) -> RiskLevel {
    if score < 0.30 {
        RiskLevel::Low
    } else if score < 0.50 {
        RiskLevel::Moderate
    } else if score < 0.75 {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

pub fn score(
    catalog: &Catalog,
    label: &str,
    confidence: f64,
    intensity: &HashMap<String, f64>,
    detected: &[String],
) -> RiskAssessment {
    let baseline = baseline_severity(catalog, label);
    let avg_intensity = average_intensity(catalog, intensity);
    let burden = (detected.len() as f64 / BURDEN_SATURATION).min(1.0);

    let raw = SEVERITY_WEIGHT * baseline
        + CONFIDENCE_WEIGHT * clamp_unit(confidence)
        + SYMPTOM_WEIGHT * ((avg_intensity + burden) / 2.0);
    let risk_score = round4(clamp_unit(raw));

    RiskAssessment {
        risk_score,
        risk_level: risk_level(risk_score),
    }
}
