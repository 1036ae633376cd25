//! Diagnostic Log Analyzer CLI Application
//!
//! Command-line interface for the session log analyzer. It uses the
//! diag-log-analyzer library and adds:
//! - TOML configuration (reference tables, analyzer tuning)
//! - Parallel multi-file analysis (one pipeline per file)
//! - Plain-text and JSON report output
//! - Optional external enrichment commentary

use anyhow::{Context, Result};
use clap::Parser;
use diag_log_analyzer::{Analyzer, AnalyzerConfig};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod enrich;
mod report;

/// Diagnostic Log Analyzer - condense automotive session logs
#[derive(Parser, Debug)]
#[command(name = "diag-log-cli")]
#[command(about = "Analyze automotive diagnostic session logs (text, XML)", long_about = None)]
#[command(version)]
struct Args {
    /// Log file(s) to analyze
    #[arg(value_name = "FILE")]
    logs: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit the structured analysis as JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override the timeline bound
    #[arg(long, value_name = "COUNT")]
    timeline_bound: Option<usize>,

    /// Hard ceiling on input lines per file
    #[arg(long, value_name = "COUNT")]
    max_lines: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    log::info!("Diagnostic Log Analyzer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using analyzer library v{}", diag_log_analyzer::VERSION);

    let app_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };

    let mut analyzer_config = app_config.analyzer.clone();
    if let Some(bound) = args.timeline_bound {
        analyzer_config.timeline_bound = bound;
    }
    if let Some(limit) = args.max_lines {
        analyzer_config.max_lines = Some(limit);
    }

    let mut files = args.logs.clone();
    if files.is_empty() {
        files = app_config.input.files.clone();
    }
    if files.is_empty() {
        println!("Diagnostic Log Analyzer - no input specified");
        println!("\nQuick Start:");
        println!("  diag-log-cli session.log");
        println!("  diag-log-cli --json session.xml other.log");
        println!("  diag-log-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    // The reference table is loaded once and shared read-only by every
    // parallel pipeline
    let reference = Arc::new(app_config.reference.build()?);
    let analyzer = Analyzer::new(reference);
    let enrichment = enrich::Enrichment::from_config(&app_config.enrichment);

    // One private pipeline instance per file; no cross-file state
    let results: Vec<(PathBuf, diag_log_analyzer::Result<diag_log_analyzer::SessionAnalysis>)> =
        files
            .par_iter()
            .map(|path| (path.clone(), analyzer.analyze_file(path, &analyzer_config)))
            .collect();

    let mut rendered = String::new();
    let mut json_sessions = Vec::new();
    let mut failures = 0usize;

    for (path, result) in results {
        match result {
            Ok(analysis) => {
                let outcome = enrichment.enrich(&analysis);
                if args.json {
                    json_sessions.push(serde_json::json!({
                        "analysis": analysis,
                        "enrichment": outcome,
                    }));
                } else {
                    rendered.push_str(&report::render(&analysis, &outcome));
                    rendered.push('\n');
                }
            }
            Err(e) => {
                failures += 1;
                log::error!("Analysis of {:?} failed: {}", path, e);
                if args.json {
                    json_sessions.push(serde_json::json!({
                        "source": path.display().to_string(),
                        "error": e.to_string(),
                    }));
                } else {
                    rendered.push_str(&format!("Analysis of {:?} failed: {}\n", path, e));
                }
            }
        }
    }

    let output = if args.json {
        serde_json::to_string_pretty(&serde_json::json!({ "sessions": json_sessions }))? + "\n"
    } else {
        rendered
    };

    match &args.output {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("Failed to write output file: {:?}", path))?,
        None => print!("{}", output),
    }

    if failures == files.len() {
        anyhow::bail!("all {} input file(s) failed to analyze", failures);
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
