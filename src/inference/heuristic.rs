//! Rule-based fallback scorer. Always usable; the router's last tier.

use crate::catalog::Catalog;

use super::types::{ClassifierError, LabelDistribution};

/// Starting score for every disease. Keeps the distribution well-formed
/// when nothing fires.
pub const BASE_SCORE: f64 = 0.05;

/// Boost applied to the quiet default when no symptoms were detected.
pub const NO_SYMPTOM_BOOST: f64 = 0.2;

/// Preferred label for the no-symptom boost.
pub const QUIET_DEFAULT_DISEASE: &str = "Common Cold";

/// Fires when the detected set intersects `triggers`.
pub struct ClusterRule {
    pub triggers: &'static [&'static str],
    pub boosts: &'static [(&'static str, f64)],
}

pub const CLUSTER_RULES: &[ClusterRule] = &[
    ClusterRule {
        triggers: &["cough", "fever", "sore_throat"],
        boosts: &[("Flu", 0.25), ("Common Cold", 0.2)],
    },
    ClusterRule {
        triggers: &["cough", "fever", "shortness_of_breath", "difficulty_breathing"],
        boosts: &[("COVID-19", 0.35)],
    },
    ClusterRule {
        triggers: &["vomiting", "diarrhea", "stomach", "nausea"],
        boosts: &[("Food Poisoning", 0.45)],
    },
    ClusterRule {
        triggers: &["headache", "nausea", "blurred_vision"],
        boosts: &[("Migraine", 0.3)],
    },
    ClusterRule {
        triggers: &["fatigue", "blurred_vision", "loss_of_appetite"],
        boosts: &[("Diabetes", 0.4)],
    },
    ClusterRule {
        triggers: &["sneezing", "itching", "hives", "watery_eyes"],
        boosts: &[("Allergy", 0.3)],
    },
    ClusterRule {
        triggers: &["difficulty_breathing", "shortness_of_breath"],
        boosts: &[("Asthma", 0.2)],
    },
    ClusterRule {
        triggers: &["joint_pain", "stiffness", "swelling"],
        boosts: &[("Arthritis", 0.3)],
    },
    ClusterRule {
        triggers: &["chills", "sweating"],
        boosts: &[("Malaria", 0.3)],
    },
    ClusterRule {
        triggers: &["rash", "muscle_pain", "joint_pain"],
        boosts: &[("Dengue", 0.2)],
    },
    ClusterRule {
        triggers: &["weakness", "dizziness"],
        boosts: &[("Anemia", 0.25)],
    },
    ClusterRule {
        triggers: &["dizziness", "blurred_vision", "rapid_heartbeat"],
        boosts: &[("Hypertension", 0.25)],
    },
    ClusterRule {
        triggers: &["fever", "weakness", "stomach"],
        boosts: &[("Typhoid", 0.15)],
    },
];

/// Deterministic symptom-cluster scorer over the catalog disease list.
pub struct RuleScorer {
    labels: Vec<String>,
    quiet_default: usize,
}

impl RuleScorer {
    pub fn new(catalog: &Catalog) -> Self {
        let quiet_default = catalog
            .disease_index(QUIET_DEFAULT_DISEASE)
            .or_else(|| {
                catalog
                    .lowest_severity_disease()
                    .and_then(|d| catalog.disease_index(d))
            })
            .unwrap_or(0);
        Self {
            labels: catalog.diseases().to_vec(),
            quiet_default,
        }
    }

    /// Raw (unnormalized) scores in catalog disease order.
    pub fn scores(&self, detected: &[String]) -> Vec<f64> {
        let mut scores = vec![BASE_SCORE; self.labels.len()];

        for rule in CLUSTER_RULES {
            let fires = rule
                .triggers
                .iter()
                .any(|t| detected.iter().any(|d| d == t));
            if !fires {
                continue;
            }
            for (label, boost) in rule.boosts {
                if let Some(index) = self.labels.iter().position(|l| l == label) {
                    scores[index] += boost;
                }
            }
        }

        if detected.is_empty() {
            if let Some(score) = scores.get_mut(self.quiet_default) {
                *score += NO_SYMPTOM_BOOST;
            }
        }
        scores
    }

    pub fn distribution(&self, detected: &[String]) -> Result<LabelDistribution, ClassifierError> {
        LabelDistribution::from_scores(&self.labels, &self.scores(detected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_symptoms_boosts_common_cold() {
        let catalog = Catalog::builtin();
        let scorer = RuleScorer::new(&catalog);
        let dist = scorer.distribution(&[]).unwrap();
        let ranked = dist.ranked();
        assert_eq!(ranked[0].0, "Common Cold");
        let total: f64 = dist.entries().iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gastro_cluster_points_to_food_poisoning() {
        let scorer = RuleScorer::new(&Catalog::builtin());
        let ranked = scorer
            .distribution(&detected(&["vomiting", "diarrhea"]))
            .unwrap()
            .ranked();
        assert_eq!(ranked[0].0, "Food Poisoning");
    }

    #[test]
    fn every_disease_keeps_base_mass() {
        let catalog = Catalog::builtin();
        let scorer = RuleScorer::new(&catalog);
        let dist = scorer.distribution(&detected(&["fever", "cough"])).unwrap();
        assert_eq!(dist.entries().len(), catalog.diseases().len());
        assert!(dist.entries().iter().all(|(_, p)| *p > 0.0));
    }

    #[test]
    fn rule_labels_exist_in_builtin_catalog() {
        let catalog = Catalog::builtin();
        for rule in CLUSTER_RULES {
            for (label, _) in rule.boosts {
                assert!(catalog.is_disease(label), "{label} missing");
            }
            for t in rule.triggers {
                assert!(catalog.is_symptom(t), "{t} missing");
            }
        }
    }

    #[test]
    fn unknown_targets_are_ignored() {
        let catalog = Catalog::new(
            vec!["cough".into()],
            vec!["Bronchitis".into()],
            vec![("Bronchitis".into(), 3)],
        )
        .unwrap();
        let scorer = RuleScorer::new(&catalog);
        // Quiet default falls back to the lowest-severity label.
        assert_eq!(scorer.scores(&[]), vec![BASE_SCORE + NO_SYMPTOM_BOOST]);
        assert_eq!(scorer.scores(&detected(&["cough"])), vec![BASE_SCORE]);
    }
}
