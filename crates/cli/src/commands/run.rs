//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{AcquisitionBlueprint, MalformedPolicy, SourceKind};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cli::{RunArgs, SourceArg};
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let blueprint = load_blueprint(args)?;

    info!(
        source = ?blueprint.source.kind,
        log = %blueprint.source.path.display(),
        output = %blueprint.sink.path.display(),
        interval_ms = blueprint.acquisition.polling_interval_ms,
        trace = blueprint.trace.enabled,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping after the current tick...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting pipeline...");
    let stats = pipeline
        .run(shutdown_rx)
        .await
        .context("Pipeline execution failed")?;

    info!(
        ticks = stats.ticks,
        frames = stats.frames,
        records = stats.records_written,
        "Pipeline completed successfully"
    );
    stats.print_summary();

    Ok(())
}

/// Load the config file (or defaults), apply CLI overrides and re-validate
pub fn load_blueprint(args: &RunArgs) -> Result<AcquisitionBlueprint> {
    if let Some(path) = &args.config {
        if !path.exists() {
            return Err(CliError::config_not_found(path.display().to_string()).into());
        }
        info!(config = %path.display(), "Loading configuration");
    }

    let mut blueprint = config_loader::ConfigLoader::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    apply_overrides(&mut blueprint, args);
    config_loader::validate(&blueprint).map_err(CliError::Overrides)?;

    Ok(blueprint)
}

/// Apply command-line overrides on top of the file configuration
fn apply_overrides(blueprint: &mut AcquisitionBlueprint, args: &RunArgs) {
    if let Some(ref log) = args.log {
        info!(log = %log.display(), "Overriding replay log from CLI");
        blueprint.source.path = log.clone();
    }
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding output path from CLI");
        blueprint.sink.path = output.clone();
    }
    if let Some(interval_ms) = args.interval_ms {
        blueprint.acquisition.polling_interval_ms = interval_ms;
    }
    if let Some(max_ticks) = args.max_ticks {
        blueprint.acquisition.max_ticks = Some(max_ticks);
    }
    if let Some(source) = args.source {
        blueprint.source.kind = match source {
            SourceArg::Replay => SourceKind::Replay,
            SourceArg::Mock => SourceKind::Mock,
        };
    }
    if args.strict {
        blueprint.source.malformed = MalformedPolicy::Report;
    }
    if args.no_trace {
        blueprint.trace.enabled = false;
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &AcquisitionBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source:");
    println!("  Kind: {:?}", blueprint.source.kind);
    match blueprint.source.kind {
        SourceKind::Replay => println!("  Log: {}", blueprint.source.path.display()),
        SourceKind::Mock => println!(
            "  Mock: base {} mm, failure every {} reads",
            blueprint.source.mock.base_distance_mm, blueprint.source.mock.failure_every
        ),
    }
    println!("  Malformed frames: {:?}", blueprint.source.malformed);

    println!("\nSink:");
    println!("  {} ({:?})", blueprint.sink.name, blueprint.sink.kind);
    println!("  Path: {}", blueprint.sink.path.display());

    println!("\nLoop:");
    println!("  Interval: {} ms", blueprint.acquisition.polling_interval_ms);
    match blueprint.acquisition.max_ticks {
        Some(max) => println!("  Max ticks: {}", max),
        None => println!("  Max ticks: unlimited"),
    }
    println!("  Hex trace: {}", if blueprint.trace.enabled { "on" } else { "off" });

    println!();
}
