use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use symptom_checker_lib::config::{self, CheckerConfig};
use symptom_checker_lib::{init_tracing, AssessmentRequest, SymptomChecker};

#[derive(Parser, Debug)]
#[command(
    name = "symptom-checker",
    version,
    about = "Assess a free-text symptom description and print the result as JSON"
)]
struct Cli {
    /// Symptom description, e.g. "mujhe bukhar aur khansi hai"
    text: String,

    /// Reported intensities as a JSON object, e.g. '{"fever": 0.9}'
    #[arg(value_parser = parse_intensity)]
    intensity: Option<HashMap<String, f64>>,

    /// Data directory (defaults to $SYMPTOM_CHECKER_HOME or ~/SymptomChecker)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn parse_intensity(raw: &str) -> Result<HashMap<String, f64>, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid intensity JSON: {e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let cfg = match cli.data_dir {
        Some(dir) => CheckerConfig::with_data_dir(dir),
        None => CheckerConfig::from_env(),
    };
    tracing::info!(
        "{} v{} data dir {}",
        config::APP_NAME,
        config::APP_VERSION,
        cfg.data_dir.display()
    );

    let checker = match SymptomChecker::from_config(&cfg) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to initialise checker: {e}");
            return ExitCode::FAILURE;
        }
    };

    let request = AssessmentRequest {
        symptom_intensity: cli.intensity.unwrap_or_default(),
        ..AssessmentRequest::new(cli.text)
    };

    match checker.assess(&request) {
        Ok(assessment) => match serde_json::to_string_pretty(&assessment) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to serialize assessment: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn text_and_intensity_parse() {
        let cli = Cli::try_parse_from(["symptom-checker", "fever", r#"{"fever": 0.9}"#]).unwrap();
        assert_eq!(cli.text, "fever");
        assert_eq!(cli.intensity.unwrap().get("fever"), Some(&0.9));
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn intensity_is_optional() {
        let cli = Cli::try_parse_from(["symptom-checker", "bukhar hai"]).unwrap();
        assert!(cli.intensity.is_none());
    }

    #[test]
    fn help_and_version_are_flags_not_text() {
        let err = Cli::try_parse_from(["symptom-checker", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["symptom-checker", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn bad_intensity_json_is_usage_error() {
        let err = Cli::try_parse_from(["symptom-checker", "fever", "{fever"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn missing_text_is_usage_error() {
        let err = Cli::try_parse_from(["symptom-checker"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn data_dir_flag() {
        let cli =
            Cli::try_parse_from(["symptom-checker", "--data-dir", "/tmp/sc", "fever"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/sc")));
    }
}
