//! Symptom Catalog: the ordered symptom and disease registries, baseline
//! severities, and the multilingual synonym table.
//!
//! Catalog order is load-bearing. Feature vectors, extraction output and the
//! heuristic tie-break all follow the order declared here.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

// ═══════════════════════════════════════════
// Built-in registries
// ═══════════════════════════════════════════

pub const SYMPTOMS: &[&str] = &[
    "pain",
    "fever",
    "ache",
    "headache",
    "nausea",
    "fatigue",
    "cough",
    "stomach",
    "shortness_of_breath",
    "vomiting",
    "diarrhea",
    "rash",
    "chills",
    "bodyache",
    "weakness",
    "sweating",
    "joint_pain",
    "stiffness",
    "loss_of_appetite",
    "congestion",
    "sore_throat",
    "sneezing",
    "watery_eyes",
    "itching",
    "swelling",
    "hives",
    "difficulty_breathing",
    "rapid_heartbeat",
    "dizziness",
    "blurred_vision",
    "tremors",
    "memory_problems",
    "anxiety",
    "concentration",
    "depression",
    "insomnia",
    "muscle_pain",
    "skin_redness",
];

pub const DISEASES: &[&str] = &[
    "Allergy",
    "Anemia",
    "Arthritis",
    "Asthma",
    "COVID-19",
    "Common Cold",
    "Dengue",
    "Diabetes",
    "Flu",
    "Food Poisoning",
    "Gastritis",
    "Hypertension",
    "Malaria",
    "Migraine",
    "Typhoid",
];

/// Baseline severity per disease, 0-10 scale.
pub const BASELINE_SEVERITY: &[(&str, u8)] = &[
    ("Allergy", 2),
    ("Anemia", 4),
    ("Arthritis", 5),
    ("Asthma", 7),
    ("COVID-19", 8),
    ("Common Cold", 2),
    ("Dengue", 8),
    ("Diabetes", 6),
    ("Flu", 6),
    ("Food Poisoning", 6),
    ("Gastritis", 4),
    ("Hypertension", 6),
    ("Malaria", 8),
    ("Migraine", 5),
    ("Typhoid", 8),
];

/// Synonyms per symptom: English, transliterated Hindi, Hindi, Telugu, Gujarati.
pub const SYMPTOM_SYNONYMS: &[(&str, &[&str])] = &[
    ("fever", &["fever", "high temperature", "pyrexia", "bukhar", "बुखार", "జ్వరం", "તાપમાન"]),
    ("cough", &["cough", "khansi", "खांसी", "దగ్గు", "ખાંસી"]),
    (
        "sore_throat",
        &["sore throat", "throat pain", "gala dard", "gale dard", "गले में दर्द", "గొంతు నొప్పి", "ગળાની પીડા"],
    ),
    ("congestion", &["congestion", "stuffed nose", "nasal block"]),
    ("headache", &["headache", "sar dard", "सर दर्द", "తలనొప్పి", "માથાનો દર્દ"]),
    ("fatigue", &["fatigue", "tired", "weakness", "thakaan", "थकान", "అలసట"]),
    ("nausea", &["nausea", "uneasy stomach", "मतली", "వికారం", "ગુમટી"]),
    ("vomiting", &["vomit", "vomiting", "ulti", "उल्टी", "వాంతులు"]),
    ("diarrhea", &["diarrhea", "loose motion", "dast", "दस्त", "విసర్జన"]),
    ("stomach", &["stomach pain", "abdominal pain", "pet dard", "पेट दर्द", "కడుపు నొప్పి"]),
    (
        "shortness_of_breath",
        &["breathless", "shortness of breath", "saans", "सांस लेने में तकलीफ"],
    ),
    ("bodyache", &["body pain", "muscle pain", "body ache"]),
    ("joint_pain", &["joint pain", "bone pain"]),
    ("weakness", &["weakness", "tired", "exhausted"]),
    ("pain", &["pain", "ache", "दर्द", "నొప్పి"]),
    ("ache", &["ache", "pain", "दर्द"]),
    ("rash", &["rash", "skin rash", "खुजली"]),
    ("chills", &["chills", "shivering", "कंपकंपी"]),
    ("sweating", &["sweating", "perspiration"]),
    ("stiffness", &["stiffness", "rigidity"]),
    ("loss_of_appetite", &["no appetite", "lack of appetite"]),
    ("sneezing", &["sneezing", "achoo", "छींक"]),
    ("watery_eyes", &["watery eyes", "tears"]),
    ("itching", &["itching", "itch", "खुजली"]),
    ("swelling", &["swelling", "edema", "सूजन"]),
    ("hives", &["hives", "urticaria", "पित्ती"]),
    ("difficulty_breathing", &["difficulty breathing", "breathing problems"]),
    ("dizziness", &["dizziness", "vertigo", "चक्कर"]),
    ("blurred_vision", &["blurred vision", "vision problems"]),
    ("tremors", &["tremors", "shaking"]),
    ("memory_problems", &["memory loss", "forgetfulness"]),
    ("anxiety", &["anxiety", "nervousness"]),
    ("depression", &["depression", "sadness"]),
    ("insomnia", &["insomnia", "sleeplessness"]),
    ("muscle_pain", &["muscle pain", "myalgia"]),
    ("skin_redness", &["redness", "erythema"]),
];

// ═══════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════

/// Catalog errors. All of these are startup-time configuration failures.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog has no {0}")]
    Empty(&'static str),

    #[error("Duplicate symptom identifier: {0}")]
    DuplicateSymptom(String),

    #[error("Duplicate disease label: {0}")]
    DuplicateDisease(String),

    #[error("Synonym data load failed ({0}): {1}")]
    SynonymLoad(String, String),

    #[error("Synonym data parse failed ({0}): {1}")]
    SynonymParse(String, String),
}

// ═══════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════

/// Ordered symptom and disease registries with string→index lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    symptoms: Vec<String>,
    symptom_index: HashMap<String, usize>,
    diseases: Vec<String>,
    disease_index: HashMap<String, usize>,
    severity: HashMap<String, u8>,
}

impl Catalog {
    /// Build a catalog from caller-supplied registries.
    ///
    /// Severities for labels outside `diseases` are dropped.
    pub fn new(
        symptoms: Vec<String>,
        diseases: Vec<String>,
        severity: impl IntoIterator<Item = (String, u8)>,
    ) -> Result<Self, CatalogError> {
        if symptoms.is_empty() {
            return Err(CatalogError::Empty("symptoms"));
        }
        if diseases.is_empty() {
            return Err(CatalogError::Empty("diseases"));
        }
        let mut seen = HashSet::new();
        for s in &symptoms {
            if !seen.insert(s.as_str()) {
                return Err(CatalogError::DuplicateSymptom(s.clone()));
            }
        }
        seen.clear();
        for d in &diseases {
            if !seen.insert(d.as_str()) {
                return Err(CatalogError::DuplicateDisease(d.clone()));
            }
        }
        Ok(Self::assemble(symptoms, diseases, severity))
    }

    /// The built-in 38-symptom / 15-disease catalog.
    pub fn builtin() -> Self {
        Self::assemble(
            SYMPTOMS.iter().map(|s| s.to_string()).collect(),
            DISEASES.iter().map(|d| d.to_string()).collect(),
            BASELINE_SEVERITY.iter().map(|(d, s)| (d.to_string(), *s)),
        )
    }

    fn assemble(
        symptoms: Vec<String>,
        diseases: Vec<String>,
        severity: impl IntoIterator<Item = (String, u8)>,
    ) -> Self {
        let symptom_index = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let disease_index: HashMap<String, usize> = diseases
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
        let severity = severity
            .into_iter()
            .filter(|(d, _)| disease_index.contains_key(d))
            .collect();
        Self {
            symptoms,
            symptom_index,
            diseases,
            disease_index,
            severity,
        }
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn diseases(&self) -> &[String] {
        &self.diseases
    }

    /// Feature-vector length *S*.
    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }

    pub fn symptom_index(&self, symptom: &str) -> Option<usize> {
        self.symptom_index.get(symptom).copied()
    }

    pub fn disease_index(&self, disease: &str) -> Option<usize> {
        self.disease_index.get(disease).copied()
    }

    pub fn is_symptom(&self, symptom: &str) -> bool {
        self.symptom_index.contains_key(symptom)
    }

    pub fn is_disease(&self, disease: &str) -> bool {
        self.disease_index.contains_key(disease)
    }

    /// Baseline severity on the 0-10 scale, if the label is known.
    pub fn severity(&self, disease: &str) -> Option<u8> {
        self.severity.get(disease).copied()
    }

    /// First label, in catalog order, carrying the lowest known severity.
    pub fn lowest_severity_disease(&self) -> Option<&str> {
        self.diseases
            .iter()
            .filter_map(|d| self.severity(d).map(|s| (d.as_str(), s)))
            .min_by_key(|(_, s)| *s)
            .map(|(d, _)| d)
    }
}

// ═══════════════════════════════════════════
// Synonym table
// ═══════════════════════════════════════════

/// Symptom id → ordered synonym list. Variants are appended, never removed.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

/// On-disk dataset shape: `{"multilingual_symptoms": {id: {lang: [terms]}}}`.
#[derive(Debug, Deserialize)]
struct MultilingualDataset {
    multilingual_symptoms: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl SynonymTable {
    pub fn builtin() -> Self {
        let entries = SYMPTOM_SYNONYMS
            .iter()
            .map(|(id, terms)| (id.to_string(), terms.iter().map(|t| t.to_string()).collect()))
            .collect();
        Self { entries }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Load a multilingual synonym dataset, flattening every language per id.
    pub fn load_multilingual(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::SynonymLoad(path.display().to_string(), e.to_string()))?;
        let dataset: MultilingualDataset = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::SynonymParse(path.display().to_string(), e.to_string()))?;

        let entries = dataset
            .multilingual_symptoms
            .into_iter()
            .map(|(id, languages)| (id, languages.into_values().flatten().collect()))
            .collect();
        Ok(Self { entries })
    }

    /// Load the dataset at `path`, or fall back to the built-in table.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load_multilingual(path) {
            Ok(table) => {
                tracing::info!(
                    path = %path.display(),
                    symptoms = table.len(),
                    "Loaded multilingual synonym dataset"
                );
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "Synonym dataset unavailable, using built-in table");
                Self::builtin()
            }
        }
    }

    pub fn get(&self, symptom: &str) -> &[String] {
        self.entries.get(symptom).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append variants not already present (compared lowercased).
    /// Returns how many were added.
    pub fn append(&mut self, symptom: &str, variants: &[String]) -> usize {
        let list = self.entries.entry(symptom.to_string()).or_default();
        let mut added = 0;
        for variant in variants {
            let trimmed = variant.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lowered = trimmed.to_lowercase();
            if list.iter().any(|v| v.to_lowercase() == lowered) {
                continue;
            }
            list.push(trimmed.to_string());
            added += 1;
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_variants(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
