//! `inspect` command implementation.

use anyhow::{Context, Result};
use contracts::{MalformedPolicy, GRID_SIDE};
use ingestion::{LogSummary, ReplaySource};
use serde::Serialize;
use tracing::info;

use crate::cli::InspectArgs;
use crate::error::CliError;

/// Inspection report for JSON output
#[derive(Serialize)]
struct InspectReport<'a> {
    log: String,
    #[serde(flatten)]
    summary: &'a LogSummary,
}

/// Execute the `inspect` command
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    info!(log = %args.log.display(), "Inspecting log");

    let summary = summarize(args)?;

    if args.json {
        let report = InspectReport {
            log: args.log.display().to_string(),
            summary: &summary,
        };
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize inspection")?;
        println!("{}", json);
    } else {
        print_summary(args, &summary);
    }

    Ok(())
}

fn summarize(args: &InspectArgs) -> Result<LogSummary> {
    let policy = if args.strict {
        MalformedPolicy::Report
    } else {
        MalformedPolicy::Skip
    };

    let mut source = ReplaySource::open(&args.log, policy)
        .map_err(|e| CliError::SourceOpen(e.into()))?;
    let metrics = source.metrics();

    let summary = LogSummary::collect(&mut source, &metrics)
        .with_context(|| format!("Failed to scan {}", args.log.display()))?;

    if summary.is_empty() {
        return Err(CliError::empty_log(args.log.display().to_string()).into());
    }
    Ok(summary)
}

fn print_summary(args: &InspectArgs, summary: &LogSummary) {
    println!("\n=== ToF Log Inspection: {} ===\n", args.log.display());
    println!("Frame pairs found: {}", summary.frames);
    println!("Malformed frames skipped: {}", summary.skipped);
    println!(
        "Valid zones per frame: {:.1} ± {:.1} (out of {})",
        summary.valid_per_frame_mean,
        summary.valid_per_frame_std,
        GRID_SIDE * GRID_SIDE
    );

    print_grid("Distance mean (mm)", &summary.distance_mean, 1);
    print_grid("Distance std (mm)", &summary.distance_std, 1);
    print_grid("Validity (%)", &summary.validity_percent, 0);
    println!();
}

/// Print a row-major zone vector as an 8x8 grid
fn print_grid(title: &str, values: &[f64], precision: usize) {
    println!("\n{title}");
    for row in render_grid(values, precision) {
        println!("  {row}");
    }
}

fn render_grid(values: &[f64], precision: usize) -> Vec<String> {
    values
        .chunks(GRID_SIDE)
        .map(|row| {
            row.iter()
                .map(|v| format!("{v:>7.precision$}"))
                .collect::<Vec<_>>()
                .join("")
        })
        .collect()
}
