use std::path::{Path, PathBuf};

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "SymptomChecker";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "SYMPTOM_CHECKER_HOME";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "symptom_checker_lib=info,symptom_checker=info,warn"
}

/// Get the application data directory.
/// `$SYMPTOM_CHECKER_HOME` if set, else ~/SymptomChecker/.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the models directory (trained classifier exports)
pub fn models_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("models")
}

/// Get the dataset directory (multilingual synonym files)
pub fn datasets_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("data")
}

/// Where the checker looks for its optional inputs.
///
/// Every path is optional at runtime: a missing classifier demotes the
/// router to the next tier and a missing synonym file falls back to the
/// built-in table.
#[derive(Debug, Clone, Serialize)]
pub struct CheckerConfig {
    pub data_dir: PathBuf,
    /// Fine-tuned classifier, tried first.
    pub primary_model: PathBuf,
    /// Legacy classifier, tried when the primary is unusable.
    pub secondary_model: PathBuf,
    pub synonyms_file: PathBuf,
}

impl CheckerConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let models = models_dir(&data_dir);
        let datasets = datasets_dir(&data_dir);
        Self {
            primary_model: models.join("primary.json"),
            secondary_model: models.join("secondary.json"),
            synonyms_file: datasets.join("multilingual_symptoms.json"),
            data_dir,
        }
    }

    pub fn from_env() -> Self {
        Self::with_data_dir(app_data_dir())
    }
}
