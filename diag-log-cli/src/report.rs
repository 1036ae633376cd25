//! Plain-text report assembly
//!
//! Renders the structured analysis into the terminal report. All content
//! comes from the library's serializable output; nothing here feeds back
//! into the pipeline.

use crate::enrich::EnrichmentOutcome;
use diag_log_analyzer::timeline::TimelineEntry;
use diag_log_analyzer::types::format_address;
use diag_log_analyzer::SessionAnalysis;
use std::fmt::Write;

/// Render one session analysis as a plain-text report
pub fn render(analysis: &SessionAnalysis, enrichment: &EnrichmentOutcome) -> String {
    let mut out = String::new();
    let source = analysis.source.as_deref().unwrap_or("<memory>");

    let _ = writeln!(out, "═══════════════════════════════════════════════");
    let _ = writeln!(out, "  Diagnostic Session Summary");
    let _ = writeln!(out, "═══════════════════════════════════════════════");
    let _ = writeln!(out, "Source:  {}", source);
    let _ = writeln!(
        out,
        "Lines:   {}   Events: {}   Buckets: {}",
        analysis.line_count,
        analysis.events.len(),
        analysis.buckets.len()
    );

    render_modules(&mut out, analysis);
    render_missing_dependencies(&mut out, analysis);
    render_mismatches(&mut out, analysis);
    render_timeline(&mut out, analysis);
    render_enrichment(&mut out, enrichment);

    out
}

fn render_modules(out: &mut String, analysis: &SessionAnalysis) {
    let _ = writeln!(out, "\nModules");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    if analysis.graph.nodes.is_empty() {
        let _ = writeln!(out, "  (no module communication observed)");
        return;
    }
    for node in analysis.graph.nodes.values() {
        let peers: Vec<String> = node.peers.iter().map(|p| format_address(*p)).collect();
        let _ = writeln!(
            out,
            "  {:>4}  {:<36} total {:>4}  ok {:>4}  failed {:>4}  peers [{}]",
            format_address(node.address),
            node.display_name,
            node.total_communications,
            node.success_count,
            node.failure_count,
            peers.join(", ")
        );
    }
}

fn render_missing_dependencies(out: &mut String, analysis: &SessionAnalysis) {
    let findings = &analysis.graph.missing_dependencies;
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nMissing dependencies");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    for finding in findings {
        let _ = writeln!(
            out,
            "  [{:?}] module {} never communicated with required peer {}",
            finding.severity,
            format_address(finding.module),
            format_address(finding.missing_peer)
        );
    }
}

fn render_mismatches(out: &mut String, analysis: &SessionAnalysis) {
    if analysis.mismatches.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nOut-of-date identifiers");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    for entry in &analysis.mismatches {
        let _ = writeln!(
            out,
            "  {}  current {}  target {}  (seen {}x)",
            entry.identifier_code, entry.current_value, entry.target_value, entry.occurrence_count
        );
    }
}

fn render_timeline(out: &mut String, analysis: &SessionAnalysis) {
    if analysis.timeline.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nTimeline");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    for entry in &analysis.timeline {
        match entry {
            TimelineEntry::Shown {
                event,
                suppressed_count,
            } => {
                let time = event
                    .timestamp
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| format!("#{}", event.index));
                let suffix = if *suppressed_count > 0 {
                    format!("  (+{} suppressed)", suppressed_count)
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "  {:>9}  [{}] {}{}",
                    time,
                    event.severity,
                    event.raw_text.trim(),
                    suffix
                );
            }
            TimelineEntry::Overflow {
                suppressed_total,
                bucket_count,
            } => {
                let _ = writeln!(
                    out,
                    "  ........  +{} further events across {} distinct buckets",
                    suppressed_total, bucket_count
                );
            }
        }
    }
}

fn render_enrichment(out: &mut String, enrichment: &EnrichmentOutcome) {
    match enrichment {
        EnrichmentOutcome::Commentary { text } => {
            let _ = writeln!(out, "\nCommentary");
            let _ = writeln!(out, "───────────────────────────────────────────────");
            let _ = writeln!(out, "{}", text);
        }
        EnrichmentOutcome::Skipped { reason } => {
            let _ = writeln!(out, "\n(enrichment skipped: {})", reason);
        }
    }
}
