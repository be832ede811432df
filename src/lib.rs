pub mod config;
pub mod catalog; // Symptom and disease vocabulary
pub mod diet;
pub mod inference; // Extraction, scoring, attribution, risk

pub use inference::{Assessment, AssessmentRequest, CheckerError, SymptomChecker};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
