//! Symptom checker context: owns the catalog, compiled matchers and scorer
//! chain, built once at startup and shared read-only across requests.
//!
//! Flow per request:
//! text + intensity → extractor → feature builder → router
//!   → (attribution, risk) → diet lookup → `Assessment`

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, SynonymTable};
use crate::config::CheckerConfig;
use crate::diet::{self, DietPlan};

use super::attribution;
use super::classifier::Classifier;
use super::extractor::{ExtractorStats, SymptomExtractor};
use super::features::build_features;
use super::risk;
use super::router::PredictionRouter;
use super::types::{
    round4, AttributionItem, CheckerError, ExtractorError, RankedLabel, RiskLevel, ScorerTier,
};

/// Minimum request text length, in characters, after trimming.
pub const MIN_TEXT_CHARS: usize = 2;

// ═══════════════════════════════════════════
// Request / response
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// ISO-like language hint: en, hi, te. Matching is language-agnostic.
    #[serde(default = "default_language")]
    pub language: String,
    pub text: String,
    #[serde(default)]
    pub symptom_intensity: HashMap<String, f64>,
}

fn default_language() -> String {
    "en".to_string()
}

impl AssessmentRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            user_id: None,
            language: default_language(),
            text: text.into(),
            symptom_intensity: HashMap::new(),
        }
    }

    pub fn with_intensity(mut self, symptom: impl Into<String>, value: f64) -> Self {
        self.symptom_intensity.insert(symptom.into(), value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: Uuid,
    pub assessed_at: DateTime<Utc>,
    pub predicted_disease: String,
    /// Rounded to 4 decimal digits.
    pub confidence: f64,
    pub top_k: Vec<RankedLabel>,
    pub scorer: ScorerTier,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub explainability: Vec<AttributionItem>,
    /// Catalog order.
    pub detected_symptoms: Vec<String>,
    pub diet: DietPlan,
}

// ═══════════════════════════════════════════
// SymptomChecker
// ═══════════════════════════════════════════

pub struct SymptomChecker {
    catalog: Arc<Catalog>,
    extractor: SymptomExtractor,
    router: PredictionRouter,
}

impl SymptomChecker {
    pub fn new(
        catalog: Catalog,
        synonyms: SynonymTable,
        primary: Option<Box<dyn Classifier>>,
        secondary: Option<Box<dyn Classifier>>,
    ) -> Result<Self, CheckerError> {
        let catalog = Arc::new(catalog);
        let extractor = SymptomExtractor::new(Arc::clone(&catalog), synonyms)?;
        let router = PredictionRouter::new(&catalog, primary, secondary);
        Ok(Self {
            catalog,
            extractor,
            router,
        })
    }

    /// Built-in catalog and synonyms, heuristic scoring only.
    pub fn builtin() -> Result<Self, CheckerError> {
        Self::new(Catalog::builtin(), SynonymTable::builtin(), None, None)
    }

    /// Built-in catalog; synonyms and classifiers from the configured
    /// paths when they load, fallbacks otherwise.
    pub fn from_config(config: &CheckerConfig) -> Result<Self, CheckerError> {
        let catalog = Arc::new(Catalog::builtin());
        let synonyms = SynonymTable::load_or_builtin(&config.synonyms_file);
        let extractor = SymptomExtractor::new(Arc::clone(&catalog), synonyms)?;
        let router = PredictionRouter::from_model_files(
            &catalog,
            &config.primary_model,
            &config.secondary_model,
        );
        Ok(Self {
            catalog,
            extractor,
            router,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scorer_tiers(&self) -> Vec<ScorerTier> {
        self.router.tiers()
    }

    pub fn extractor_stats(&self) -> ExtractorStats {
        self.extractor.stats()
    }

    /// Administrative path: add synonym variants for a catalog symptom.
    pub fn add_symptom_variants(
        &self,
        symptom: &str,
        variants: &[String],
    ) -> Result<usize, ExtractorError> {
        self.extractor.add_variants(symptom, variants)
    }

    /// Validate the request, then run the pipeline.
    pub fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, CheckerError> {
        validate_text(&request.text)?;
        Ok(self.run(&request.text, &request.symptom_intensity))
    }

    /// Run the pipeline without request validation. Empty text is valid here.
    pub fn run(&self, text: &str, intensity: &HashMap<String, f64>) -> Assessment {
        let assessment_id = Uuid::new_v4();
        let _span = tracing::info_span!("assessment", id = %assessment_id).entered();

        let (features, detected) = build_features(&self.catalog, &self.extractor, text, intensity);
        let prediction = self.router.predict(&features, &detected);
        let explainability = attribution::explain(&self.catalog, &features, &detected);
        let risk = risk::score(
            &self.catalog,
            &prediction.label,
            prediction.confidence,
            intensity,
            &detected,
        );
        let diet = diet::recommend(&prediction.label, risk.risk_level);

        tracing::debug!(
            detected = detected.len(),
            scorer = prediction.scorer.as_str(),
            risk_level = risk.risk_level.as_str(),
            "Assessment complete"
        );

        Assessment {
            assessment_id,
            assessed_at: Utc::now(),
            predicted_disease: prediction.label,
            confidence: round4(prediction.confidence),
            top_k: prediction.top_k,
            scorer: prediction.scorer,
            risk_level: risk.risk_level,
            risk_score: risk.risk_score,
            explainability,
            detected_symptoms: detected,
            diet,
        }
    }
}

fn validate_text(text: &str) -> Result<(), CheckerError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CheckerError::EmptyText);
    }
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(CheckerError::TextTooShort {
            min: MIN_TEXT_CHARS,
        });
    }
    Ok(())
}
