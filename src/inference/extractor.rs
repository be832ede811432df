//! Symptom Extractor: compiles synonym lists into matchers and scans
//! normalized text for catalog symptoms.
//!
//! Reads go through an `Arc` snapshot of the compiled matchers. Adding
//! variants builds a replacement snapshot off to the side and swaps it in,
//! so a reader never sees a half-rebuilt matcher set.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use regex::RegexSet;
use serde::Serialize;

use crate::catalog::{Catalog, SynonymTable};

use super::types::ExtractorError;

/// Compiled matchers, one `RegexSet` per catalog symptom (same order).
#[derive(Debug, Clone)]
struct CompiledMatchers {
    sets: Vec<RegexSet>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractorStats {
    pub total_symptoms: usize,
    pub indexed_symptoms: usize,
    pub total_synonym_variants: usize,
    pub avg_variants_per_symptom: usize,
}

pub struct SymptomExtractor {
    catalog: Arc<Catalog>,
    /// Write path only. Held across recompilation so updates are serialized.
    synonyms: Mutex<SynonymTable>,
    matchers: RwLock<Arc<CompiledMatchers>>,
}

impl SymptomExtractor {
    /// Compile every catalog symptom's synonyms. Ids in `synonyms` that are
    /// not in the catalog are kept in the table but never compiled.
    pub fn new(catalog: Arc<Catalog>, synonyms: SynonymTable) -> Result<Self, ExtractorError> {
        let sets = catalog
            .symptoms()
            .iter()
            .map(|symptom| compile_symptom(symptom, synonyms.get(symptom)))
            .collect::<Result<Vec<_>, _>>()?;

        let indexed = sets.iter().filter(|s| !s.is_empty()).count();
        tracing::info!(
            symptoms = catalog.symptom_count(),
            indexed,
            variants = synonyms.total_variants(),
            "Symptom matchers compiled"
        );

        Ok(Self {
            catalog,
            synonyms: Mutex::new(synonyms),
            matchers: RwLock::new(Arc::new(CompiledMatchers { sets })),
        })
    }

    fn snapshot(&self) -> Arc<CompiledMatchers> {
        let guard = self.matchers.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Detected symptom ids, in catalog order, at most once each.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let cleaned = normalize_text(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let snapshot = self.snapshot();
        self.catalog
            .symptoms()
            .iter()
            .zip(&snapshot.sets)
            .filter(|(_, set)| set.is_match(&cleaned))
            .map(|(symptom, _)| symptom.clone())
            .collect()
    }

    /// Current synonym variants for `symptom` (empty if unknown).
    pub fn synonyms_for(&self, symptom: &str) -> Vec<String> {
        let table = self.synonyms.lock().unwrap_or_else(PoisonError::into_inner);
        table.get(symptom).to_vec()
    }

    /// Append new synonym variants for a catalog symptom and recompile its
    /// matcher. Returns the number of variants actually added; unknown ids
    /// add nothing.
    ///
    /// The new matcher is live by the time this returns.
    pub fn add_variants(&self, symptom: &str, variants: &[String]) -> Result<usize, ExtractorError> {
        let Some(index) = self.catalog.symptom_index(symptom) else {
            tracing::debug!(symptom, "Ignoring variants for unknown symptom");
            return Ok(0);
        };

        let mut table = self.synonyms.lock().unwrap_or_else(PoisonError::into_inner);

        // Stage and compile first; the table is only touched once the
        // replacement matcher exists.
        let mut staged =
            SynonymTable::from_entries([(symptom.to_string(), table.get(symptom).to_vec())]);
        let added = staged.append(symptom, variants);
        if added == 0 {
            return Ok(0);
        }
        let set = compile_symptom(symptom, staged.get(symptom))?;

        let mut next = (*self.snapshot()).clone();
        next.sets[index] = set;
        {
            let mut guard = self.matchers.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::new(next);
        }
        table.append(symptom, variants);

        tracing::info!(symptom, added, "Symptom variants added");
        Ok(added)
    }

    pub fn stats(&self) -> ExtractorStats {
        let snapshot = self.snapshot();
        let indexed = snapshot.sets.iter().filter(|s| !s.is_empty()).count();
        let table = self.synonyms.lock().unwrap_or_else(PoisonError::into_inner);
        let total: usize = self
            .catalog
            .symptoms()
            .iter()
            .map(|s| table.get(s).len())
            .sum();

        ExtractorStats {
            total_symptoms: self.catalog.symptom_count(),
            indexed_symptoms: indexed,
            total_synonym_variants: total,
            avg_variants_per_symptom: if indexed == 0 { 0 } else { total / indexed },
        }
    }
}

/// Lowercase, trim, collapse whitespace runs to single spaces.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pattern source for one synonym.
///
/// ASCII terms get word boundaries on any edge that is a word character,
/// so "pain" does not fire inside "painting". Non-ASCII terms match as raw
/// substrings; word boundaries are unreliable for Indic scripts.
fn term_pattern(term: &str) -> Option<String> {
    let lowered = normalize_text(term);
    if lowered.is_empty() {
        return None;
    }
    let escaped = regex::escape(&lowered);
    if !lowered.is_ascii() {
        return Some(escaped);
    }

    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut pattern = String::with_capacity(escaped.len() + 4);
    if lowered.starts_with(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&escaped);
    if lowered.ends_with(is_word) {
        pattern.push_str(r"\b");
    }
    Some(pattern)
}

fn compile_symptom(symptom: &str, terms: &[String]) -> Result<RegexSet, ExtractorError> {
    let patterns: Vec<String> = terms.iter().filter_map(|t| term_pattern(t)).collect();
    RegexSet::new(&patterns).map_err(|source| ExtractorError::Pattern {
        symptom: symptom.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SymptomExtractor {
        SymptomExtractor::new(Arc::new(Catalog::builtin()), SynonymTable::builtin()).unwrap()
    }

    // =================================================================
    // NORMALIZATION
    // =================================================================

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_text("  Hello   WORLD  "), "hello world");
        assert_eq!(normalize_text("a\t\nb"), "a b");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn ascii_terms_get_word_boundaries() {
        assert_eq!(term_pattern("Pain").as_deref(), Some(r"\bpain\b"));
        assert_eq!(term_pattern("sore throat").as_deref(), Some(r"\bsore throat\b"));
        assert_eq!(term_pattern("बुखार").as_deref(), Some("बुखार"));
        assert_eq!(term_pattern("  "), None);
    }

    // =================================================================
    // EXTRACTION
    // =================================================================

    #[test]
    fn extracts_english_symptoms() {
        let hits = extractor().extract("I have fever and cough");
        assert!(hits.contains(&"fever".to_string()));
        assert!(hits.contains(&"cough".to_string()));
    }

    #[test]
    fn extracts_multiple_in_catalog_order() {
        let hits = extractor().extract("headache, sore throat, cough, fever");
        let catalog = Catalog::builtin();
        let positions: Vec<usize> = hits
            .iter()
            .map(|h| catalog.symptom_index(h).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(hits.len() >= 3);
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        let ex = extractor();
        assert!(ex.extract("").is_empty());
        assert!(ex.extract("   \n\t ").is_empty());
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        assert!(extractor().extract("xyz abc qwerty").is_empty());
    }

    #[test]
    fn case_invariant_for_ascii() {
        let ex = extractor();
        let text = "Fever and a bad Cough with body ache";
        assert_eq!(ex.extract(text), ex.extract(&text.to_uppercase()));
    }

    #[test]
    fn word_boundary_blocks_partial_words() {
        let ex = extractor();
        assert!(ex.extract("I have pain").contains(&"pain".to_string()));
        assert!(!ex.extract("I like painting").contains(&"pain".to_string()));
        // "ache" standalone fires, but not inside "headache".
        let hits = ex.extract("my headache");
        assert!(hits.contains(&"headache".to_string()));
        assert!(!hits.contains(&"ache".to_string()));
        assert!(ex.extract("a dull ache").contains(&"ache".to_string()));
    }

    #[test]
    fn transliterated_hindi() {
        let ex = extractor();
        let hits = ex.extract("mujhe bukhar aur khansi hai");
        assert!(hits.contains(&"fever".to_string()));
        assert!(hits.contains(&"cough".to_string()));
        assert!(ex.extract("gale dard").contains(&"sore_throat".to_string()));
    }

    #[test]
    fn native_script_substring_match() {
        let ex = extractor();
        let hits = ex.extract("मुझे बुखार है");
        assert_eq!(hits, vec!["fever".to_string()]);
        assert!(ex.extract("నాకు దగ్గు ఉంది").contains(&"cough".to_string()));
    }

    #[test]
    fn detections_are_always_catalog_ids() {
        let catalog = Catalog::builtin();
        let ex = extractor();
        for text in ["fever cough rash hives", "pet dard ulti dast", "nothing here"] {
            for hit in ex.extract(text) {
                assert!(catalog.is_symptom(&hit));
            }
        }
    }

    #[test]
    fn synonyms_for_unknown_ids_are_ignored() {
        let table = SynonymTable::from_entries([
            ("fever".to_string(), vec!["fever".to_string()]),
            ("runny_nose".to_string(), vec!["runny nose".to_string()]),
        ]);
        let ex = SymptomExtractor::new(Arc::new(Catalog::builtin()), table).unwrap();
        assert_eq!(ex.extract("runny nose and fever"), vec!["fever".to_string()]);
    }

    // =================================================================
    // RUNTIME VARIANTS
    // =================================================================

    #[test]
    fn added_variant_is_live_after_return() {
        let ex = extractor();
        assert!(ex.extract("tez taap").is_empty());
        let added = ex.add_variants("fever", &["taap".to_string()]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(ex.extract("tez taap"), vec!["fever".to_string()]);
        assert!(ex.synonyms_for("fever").contains(&"taap".to_string()));
    }

    #[test]
    fn duplicate_or_unknown_variants_add_nothing() {
        let ex = extractor();
        assert_eq!(ex.add_variants("fever", &["Fever".to_string()]).unwrap(), 0);
        assert_eq!(ex.add_variants("not_a_symptom", &["x".to_string()]).unwrap(), 0);
        assert!(ex.synonyms_for("not_a_symptom").is_empty());
    }

    #[test]
    fn stats_count_catalog_synonyms() {
        let ex = extractor();
        let before = ex.stats();
        assert_eq!(before.total_symptoms, 38);
        assert_eq!(before.indexed_symptoms, 36);
        ex.add_variants("tremors", &["kaampna".to_string()]).unwrap();
        let after = ex.stats();
        assert_eq!(after.total_synonym_variants, before.total_synonym_variants + 1);
    }

    #[test]
    fn concurrent_reads_during_updates() {
        let ex = extractor();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let hits = ex.extract("fever and cough");
                        assert!(hits.contains(&"fever".to_string()));
                        assert!(hits.contains(&"cough".to_string()));
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..20 {
                    ex.add_variants("insomnia", &[format!("neend nahi {i}")]).unwrap();
                }
            });
        });
        assert!(ex.extract("neend nahi 19").contains(&"insomnia".to_string()));
    }
}
