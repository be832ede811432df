//! Diet recommendation lookup keyed by predicted disease and risk tier.

use serde::{Deserialize, Serialize};

use crate::inference::types::RiskLevel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DietPlan {
    pub recommended: Vec<String>,
    pub avoid: Vec<String>,
    pub notes: Vec<String>,
}

struct PlanEntry {
    disease: &'static str,
    recommended: &'static [&'static str],
    avoid: &'static [&'static str],
    notes: &'static [&'static str],
}

const PLANS: &[PlanEntry] = &[
    PlanEntry {
        disease: "Common Cold",
        recommended: &["Warm soups", "Citrus fruits", "Ginger tea", "Protein-rich dal"],
        avoid: &["Deep-fried foods", "Sugary drinks"],
        notes: &["Prioritize hydration", "Increase vitamin C intake"],
    },
    PlanEntry {
        disease: "Flu",
        recommended: &["Electrolyte fluids", "Oats", "Boiled vegetables", "Yogurt"],
        avoid: &["Processed meat", "Cold sugary beverages"],
        notes: &["Soft food for sore throat", "Adequate rest + fluids"],
    },
    PlanEntry {
        disease: "COVID-19",
        recommended: &[
            "High-protein meals",
            "Vitamin D sources",
            "Zinc-rich nuts",
            "Anti-inflammatory foods",
        ],
        avoid: &["Highly processed foods", "Excess sugar"],
        notes: &["Monitor hydration", "Small frequent meals if fatigued"],
    },
    PlanEntry {
        disease: "Food Poisoning",
        recommended: &["ORS", "Banana", "Rice", "Steamed apple"],
        avoid: &["Spicy foods", "Milk (acute phase)", "High-fat meals"],
        notes: &["Low-fiber bland diet initially", "Rehydrate aggressively"],
    },
    PlanEntry {
        disease: "Migraine",
        recommended: &["Magnesium-rich seeds", "Whole grains", "Leafy greens"],
        avoid: &["Aged cheese", "Excess caffeine", "Alcohol"],
        notes: &["Keep regular meal timings", "Track trigger foods"],
    },
    PlanEntry {
        disease: "Diabetes",
        recommended: &["Low-GI grains", "Lean proteins", "Legumes", "Non-starchy vegetables"],
        avoid: &["Refined sugar", "Sweetened beverages", "Trans fats"],
        notes: &["Balanced carbohydrate distribution", "Portion control"],
    },
];

const DEFAULT_PLAN: PlanEntry = PlanEntry {
    disease: "",
    recommended: &["Balanced plate", "Seasonal fruits", "Adequate protein"],
    avoid: &["Ultra-processed foods"],
    notes: &["Consult a registered dietitian for personalization"],
};

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn recommend(disease: &str, risk_level: RiskLevel) -> DietPlan {
    let entry = PLANS
        .iter()
        .find(|p| p.disease == disease)
        .unwrap_or(&DEFAULT_PLAN);

    let mut plan = DietPlan {
        recommended: owned(entry.recommended),
        avoid: owned(entry.avoid),
        notes: owned(entry.notes),
    };

    if risk_level.is_elevated() {
        plan.recommended.push("Easily digestible meals".into());
        plan.avoid.push("Large heavy meals".into());
        plan.notes.push("Seek medical supervision promptly".into());
    }
    plan
}
