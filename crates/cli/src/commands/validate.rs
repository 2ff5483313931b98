//! `validate` command implementation.
//!
//! Loads and validates a blueprint without opening any file it names, then
//! reports startup problems that validation alone cannot see (a missing replay
//! log, a mock configured to fail) as warnings.

use anyhow::{Context, Result};
use contracts::{AcquisitionBlueprint, SinkType, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation report (also the JSON output)
#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blueprint: Option<BlueprintDigest>,
}

/// What a run with this blueprint would do
#[derive(Debug, Serialize)]
struct BlueprintDigest {
    version: String,
    source: String,
    input: Option<String>,
    sink: String,
    output: Option<String>,
    polling_interval_ms: u64,
    max_ticks: Option<u64>,
    hex_trace: bool,
}

impl ValidationReport {
    fn rejected(config_path: String, error: impl ToString) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error.to_string()),
            warnings: Vec::new(),
            blueprint: None,
        }
    }

    fn accepted(config_path: String, blueprint: &AcquisitionBlueprint) -> Self {
        Self {
            valid: true,
            config_path,
            error: None,
            warnings: startup_warnings(blueprint),
            blueprint: Some(BlueprintDigest::from(blueprint)),
        }
    }

    fn print(&self) {
        if !self.valid {
            println!("✗ Configuration is invalid: {}", self.config_path);
            if let Some(error) = &self.error {
                println!("\n  Error: {error}");
            }
            return;
        }

        println!("✓ Configuration is valid: {}", self.config_path);
        if let Some(digest) = &self.blueprint {
            println!("\n  Version:   {}", digest.version);
            match &digest.input {
                Some(input) => println!("  Source:    {} ({input})", digest.source),
                None => println!("  Source:    {}", digest.source),
            }
            match &digest.output {
                Some(output) => println!("  Sink:      {} -> {output}", digest.sink),
                None => println!("  Sink:      {}", digest.sink),
            }
            match digest.max_ticks {
                Some(ticks) => println!(
                    "  Loop:      every {} ms, {ticks} ticks",
                    digest.polling_interval_ms
                ),
                None => println!(
                    "  Loop:      every {} ms until interrupted",
                    digest.polling_interval_ms
                ),
            }
            println!("  Hex trace: {}", if digest.hex_trace { "on" } else { "off" });
        }

        if !self.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &self.warnings {
                println!("  - {warning}");
            }
        }
    }
}

impl From<&AcquisitionBlueprint> for BlueprintDigest {
    fn from(blueprint: &AcquisitionBlueprint) -> Self {
        let replay = blueprint.source.kind == SourceKind::Replay;
        let csv = blueprint.sink.kind == SinkType::Csv;

        Self {
            version: format!("{:?}", blueprint.version),
            source: format!("{:?}", blueprint.source.kind).to_lowercase(),
            input: replay.then(|| blueprint.source.path.display().to_string()),
            sink: format!(
                "{} ({})",
                blueprint.sink.name,
                format!("{:?}", blueprint.sink.kind).to_lowercase()
            ),
            output: csv.then(|| blueprint.sink.path.display().to_string()),
            polling_interval_ms: blueprint.acquisition.polling_interval_ms,
            max_ticks: blueprint.acquisition.max_ticks,
            hex_trace: blueprint.trace.enabled,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let report = validate_config(args);
    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize validation report")?;
        println!("{json}");
    } else {
        report.print();
    }

    anyhow::ensure!(report.valid, "Configuration validation failed");
    Ok(())
}

fn validate_config(args: &ValidateArgs) -> ValidationReport {
    let config_path = args.config.display().to_string();

    if !args.config.is_file() {
        let error = format!("File not found: {config_path}");
        return ValidationReport::rejected(config_path, error);
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationReport::accepted(config_path, &blueprint),
        Err(e) => ValidationReport::rejected(config_path, e),
    }
}

/// Non-fatal issues that would still stop or hollow out a run
fn startup_warnings(blueprint: &AcquisitionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    match blueprint.source.kind {
        SourceKind::Replay if !blueprint.source.path.is_file() => warnings.push(format!(
            "replay log {} does not exist, run will fail at startup",
            blueprint.source.path.display()
        )),
        SourceKind::Mock if blueprint.source.mock.fail_init => {
            warnings.push("source.mock.fail_init is set, run will fail at startup".to_string())
        }
        _ => {}
    }

    if blueprint.sink.kind == SinkType::Log {
        warnings.push("sink kind is 'log', records will not be persisted".to_string());
    }

    if !blueprint.trace.enabled && blueprint.sink.kind == SinkType::Log {
        warnings.push("hex trace disabled and nothing persisted, run has no output".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tof.toml");
        std::fs::write(&config, "[sink]\nkind = \"log\"\n\n[trace]\nenabled = false\n").unwrap();

        let report = validate_config(&ValidateArgs { config, json: true });
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.contains("not be persisted")));
        assert!(report.warnings.iter().any(|w| w.contains("no output")));

        let digest = report.blueprint.unwrap();
        assert_eq!(digest.sink, "tof_csv (log)");
        assert_eq!(digest.output, None);
    }

    #[test]
    fn test_mock_digest_has_no_input() {
        let blueprint = AcquisitionBlueprint {
            source: contracts::SourceConfig {
                kind: SourceKind::Mock,
                ..Default::default()
            },
            ..Default::default()
        };

        let digest = BlueprintDigest::from(&blueprint);
        assert_eq!(digest.source, "mock");
        assert_eq!(digest.input, None);
        assert_eq!(digest.output.as_deref(), Some("tof_log.csv"));
        assert!(startup_warnings(&blueprint).is_empty());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("tof.json");
        std::fs::write(&config, r#"{"acquisition": {"polling_interval_ms": 0}}"#).unwrap();

        let args = ValidateArgs {
            config,
            json: false,
        };
        let report = validate_config(&args);
        assert!(!report.valid);
        assert!(report.error.unwrap().contains("polling_interval_ms"));
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_missing_file() {
        let report = validate_config(&ValidateArgs {
            config: "/nonexistent/tof.toml".into(),
            json: true,
        });
        assert!(!report.valid);
        assert!(report.error.unwrap().starts_with("File not found"));
    }
}
