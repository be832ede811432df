pub mod types;
pub mod extractor; // Multilingual symptom matching
pub mod features;
pub mod classifier; // Trained scorer capability
pub mod heuristic;
pub mod router; // Tiered scorer fallback
pub mod attribution;
pub mod risk;
pub mod checker; // End-to-end assessment context

pub use checker::{Assessment, AssessmentRequest, SymptomChecker};
pub use types::{CheckerError, RiskLevel, ScorerTier};
