//! Prediction Router: ranked scorer tiers with silent demotion.
//!
//! Resolution order, first usable tier wins for the whole call:
//! 1. Primary trained classifier (if loaded and ready)
//! 2. Secondary (legacy) classifier (if loaded and ready)
//! 3. Heuristic rule scorer (always usable)
//!
//! A tier that fails to load, is not ready, errors, or returns a malformed
//! distribution is logged and skipped. Callers never see a scorer error.
//!
//! Trained output is narrowed to catalog diseases before ranking; a tier
//! whose mass falls entirely outside the catalog is demoted.

use std::path::Path;

use crate::catalog::Catalog;

use super::classifier::{Classifier, SoftmaxClassifier};
use super::heuristic::RuleScorer;
use super::types::{
    round4, ClassifierError, FeatureVector, LabelDistribution, Prediction, RankedLabel,
    ScorerTier,
};

/// Number of ranked labels reported alongside the best one.
pub const TOP_K: usize = 3;

// ──────────────────────────────────────────────
// Scorer
// ──────────────────────────────────────────────

pub enum Scorer {
    Trained {
        tier: ScorerTier,
        classifier: Box<dyn Classifier>,
    },
    Heuristic(RuleScorer),
}

impl Scorer {
    pub fn tier(&self) -> ScorerTier {
        match self {
            Self::Trained { tier, .. } => *tier,
            Self::Heuristic(_) => ScorerTier::Heuristic,
        }
    }

    fn distribution(
        &self,
        features: &FeatureVector,
        detected: &[String],
    ) -> Result<LabelDistribution, ClassifierError> {
        match self {
            Self::Trained { classifier, .. } => {
                if !classifier.is_ready() {
                    return Err(ClassifierError::NotReady(classifier.name().to_string()));
                }
                let probs = classifier.predict_proba(features)?;
                LabelDistribution::from_scores(classifier.labels(), &probs)
            }
            Self::Heuristic(rules) => rules.distribution(detected),
        }
    }
}

// ──────────────────────────────────────────────
// Router
// ──────────────────────────────────────────────

pub struct PredictionRouter {
    /// Ranked; the heuristic scorer is always last.
    scorers: Vec<Scorer>,
    /// Catalog disease order. Scorer output is restricted to these labels
    /// and reordered, so ties break by catalog position.
    catalog_labels: Vec<String>,
}

impl PredictionRouter {
    pub fn new(
        catalog: &Catalog,
        primary: Option<Box<dyn Classifier>>,
        secondary: Option<Box<dyn Classifier>>,
    ) -> Self {
        let mut scorers = Vec::with_capacity(3);
        if let Some(classifier) = primary {
            scorers.push(Scorer::Trained {
                tier: ScorerTier::Primary,
                classifier,
            });
        }
        if let Some(classifier) = secondary {
            scorers.push(Scorer::Trained {
                tier: ScorerTier::Secondary,
                classifier,
            });
        }
        scorers.push(Scorer::Heuristic(RuleScorer::new(catalog)));

        tracing::info!(
            tiers = ?scorers.iter().map(|s| s.tier().as_str()).collect::<Vec<_>>(),
            "Prediction router ready"
        );
        Self {
            scorers,
            catalog_labels: catalog.diseases().to_vec(),
        }
    }

    /// Heuristic tier only.
    pub fn heuristic_only(catalog: &Catalog) -> Self {
        Self::new(catalog, None, None)
    }

    /// Load both classifier exports; a file that fails to load leaves its
    /// tier out of the chain.
    pub fn from_model_files(catalog: &Catalog, primary: &Path, secondary: &Path) -> Self {
        let primary = load_tier(catalog, primary, ScorerTier::Primary);
        let secondary = load_tier(catalog, secondary, ScorerTier::Secondary);
        Self::new(catalog, primary, secondary)
    }

    pub fn tiers(&self) -> Vec<ScorerTier> {
        self.scorers.iter().map(Scorer::tier).collect()
    }

    /// Route one prediction through the first usable tier.
    pub fn predict(&self, features: &FeatureVector, detected: &[String]) -> Prediction {
        for scorer in &self.scorers {
            let routed = scorer
                .distribution(features, detected)
                .and_then(|dist| dist.restrict_to(&self.catalog_labels));
            match routed {
                Ok(dist) => {
                    tracing::debug!(tier = scorer.tier().as_str(), "Prediction routed");
                    return summarize(&dist, scorer.tier());
                }
                Err(e) => {
                    tracing::warn!(
                        tier = scorer.tier().as_str(),
                        error = %e,
                        "Scorer unusable, demoting to next tier"
                    );
                }
            }
        }

        // The heuristic scorer only fails on an empty label set, which the
        // catalog rules out. Keep the contract with a uniform fallback.
        let uniform = vec![1.0; self.catalog_labels.len()];
        LabelDistribution::from_scores(&self.catalog_labels, &uniform)
            .map(|dist| summarize(&dist, ScorerTier::Heuristic))
            .unwrap_or_else(|_| Prediction {
                label: String::new(),
                confidence: 0.0,
                top_k: Vec::new(),
                scorer: ScorerTier::Heuristic,
            })
    }
}

fn load_tier(catalog: &Catalog, path: &Path, tier: ScorerTier) -> Option<Box<dyn Classifier>> {
    match SoftmaxClassifier::load(path, catalog) {
        Ok(model) => Some(Box::new(model)),
        Err(e) => {
            tracing::warn!(
                tier = tier.as_str(),
                path = %path.display(),
                error = %e,
                "Classifier unavailable"
            );
            None
        }
    }
}

/// Best label, its probability, and the rounded top-k.
fn summarize(dist: &LabelDistribution, tier: ScorerTier) -> Prediction {
    let ranked = dist.ranked();
    let (label, confidence) = ranked
        .first()
        .cloned()
        .unwrap_or_else(|| (String::new(), 0.0));
    let top_k = ranked
        .iter()
        .take(TOP_K)
        .map(|(disease, p)| RankedLabel {
            disease: disease.clone(),
            probability: round4(*p),
        })
        .collect();
    Prediction {
        label,
        confidence,
        top_k,
        scorer: tier,
    }
}
