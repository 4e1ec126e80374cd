//! Extract command - send PDFs to the extraction gateway and store the results.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use invex_core::error::{ExtractionError, InvexError};
use invex_core::extraction::{BatchOptions, GeminiGateway, ingest};
use invex_core::models::config::ExtractionConfig;
use invex_core::models::record::RecordField;
use invex_core::pdf::PdfInput;
use invex_core::store::RecordStore;

use super::{Context, render};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Number of files extracted in parallel
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Per-file timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Do not keep the source PDF with each record
    #[arg(long)]
    no_retain_pdf: bool,

    /// Print the extracted records
    #[arg(long)]
    show: bool,
}

pub async fn run(args: ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(", "));
    }

    // Reject non-PDFs and oversized files before anything is sent
    let max_size = ctx.config.extraction.max_file_size;
    let mut inputs = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();
    for path in &files {
        match PdfInput::from_path(path, max_size) {
            Ok(input) => inputs.push(input),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                rejected.push((path.clone(), e.to_string()));
            }
        }
    }

    for (path, reason) in &rejected {
        eprintln!(
            "{} Skipped {}: {}",
            style("⚠").yellow(),
            path.display(),
            reason
        );
    }

    if inputs.is_empty() {
        anyhow::bail!("No valid PDF files to process");
    }

    let extraction = effective_config(&args, &ctx.config.extraction);
    let options = BatchOptions::from(&extraction);
    let gateway = GeminiGateway::from_config(&extraction)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Extracting {} file(s)...", inputs.len()));

    let result = ingest(&gateway, &ctx.store, &inputs, &options).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(InvexError::Extraction(ExtractionError::NoData { attempted })) => {
            anyhow::bail!(
                "No data extracted: all {} file(s) failed. Please try again.",
                attempted
            );
        }
        Err(e) => return Err(e.into()),
    };

    if report.is_partial() {
        println!(
            "{} Partial extraction: {}",
            style("⚠").yellow(),
            report.summary()
        );
        for failure in &report.failures {
            println!("  - {}: {}", failure.name, failure.error);
        }
    } else {
        println!("{} {}", style("✓").green(), report.summary());
    }

    println!(
        "   {} new, {} updated in {}ms",
        style(report.merge.added).green(),
        style(report.merge.updated).cyan(),
        report.processing_time_ms
    );

    if args.show {
        println!();
        print!(
            "{}",
            render::table(&report.records, &RecordField::TABLE_ORDER, ctx.placeholder())
        );
    }

    let total = ctx.store.read_all().len();
    debug!("Store now holds {} invoices", total);
    println!("   {} invoice(s) stored in {}", total, ctx.store.path().display());

    Ok(())
}

/// Extraction settings with command-line overrides applied.
fn effective_config(args: &ExtractArgs, base: &ExtractionConfig) -> ExtractionConfig {
    let mut config = base.clone();
    if let Some(jobs) = args.jobs {
        config.max_concurrency = jobs;
    }
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    if args.no_retain_pdf {
        config.retain_pdf = false;
    }
    config
}

/// Expand glob patterns; plain paths are kept even when they do not match a glob.
/// Each file appears once, at its first position.
fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let matches: Vec<PathBuf> = glob(pattern)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();

        if matches.is_empty() {
            let path = Path::new(pattern);
            if path.is_file() {
                if seen.insert(path.to_path_buf()) {
                    files.push(path.to_path_buf());
                }
            } else {
                warn!("No files match {}", pattern);
            }
        } else {
            for file in matches {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }
    }

    Ok(files)
}
