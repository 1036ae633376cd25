//! Main analyzer API
//!
//! Entry point for the library: owns the shared read-only reference table
//! and runs the full pipeline over one input at a time. Each call owns all
//! of its mutable state, so independent files can be analyzed from parallel
//! threads with one shared `Analyzer`.

use crate::bucket::{self, Bucket};
use crate::config::AnalyzerConfig;
use crate::graph::{self, ModuleGraph};
use crate::ingest;
use crate::mismatch::{self, MismatchEntry};
use crate::reference::ModuleReference;
use crate::stream;
use crate::timeline::{self, TimelineEntry};
use crate::types::{DiagnosticEvent, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// The complete structured output of one session analysis.
///
/// Plain serializable data with no presentation formatting - the report
/// boundary and the optional enrichment collaborator both consume this.
#[derive(Debug, Clone, Serialize)]
pub struct SessionAnalysis {
    /// Source file, when the input came from disk
    pub source: Option<String>,
    /// Raw lines ingested (after blank-line removal)
    pub line_count: usize,
    /// Classified diagnostic events, in source order
    pub events: Vec<DiagnosticEvent>,
    /// Deduplicated buckets in first-occurrence order
    pub buckets: Vec<Bucket>,
    /// Communication graph with per-module stats and findings
    pub graph: ModuleGraph,
    /// Out-of-date identifier entries
    pub mismatches: Vec<MismatchEntry>,
    /// Reduced timeline, at most `timeline_bound + 1` entries
    pub timeline: Vec<TimelineEntry>,
}

/// The main analyzer - entry point for all analysis operations
pub struct Analyzer {
    reference: Arc<dyn ModuleReference + Send + Sync>,
}

impl Analyzer {
    /// Create an analyzer sharing the given reference table.
    ///
    /// The table is loaded once at startup and treated as immutable; the
    /// same `Arc` serves every concurrent pipeline instance.
    pub fn new(reference: Arc<dyn ModuleReference + Send + Sync>) -> Self {
        Self { reference }
    }

    /// Analyze a log file from disk
    pub fn analyze_file(&self, path: &Path, config: &AnalyzerConfig) -> Result<SessionAnalysis> {
        let lines = ingest::read_file(path, config)?;
        let mut analysis = self.run(lines, config);
        analysis.source = Some(path.display().to_string());
        log::info!(
            "Analyzed {:?}: {} events, {} buckets, {} mismatches",
            path,
            analysis.events.len(),
            analysis.buckets.len(),
            analysis.mismatches.len()
        );
        Ok(analysis)
    }

    /// Analyze an in-memory log
    pub fn analyze_str(&self, input: &str, config: &AnalyzerConfig) -> Result<SessionAnalysis> {
        let lines = ingest::ingest_str(input, config)?;
        Ok(self.run(lines, config))
    }

    fn run(&self, lines: Vec<crate::types::RawLine>, config: &AnalyzerConfig) -> SessionAnalysis {
        let events = stream::build_events(&lines, self.reference.as_ref(), config);
        let buckets = bucket::bucketize(&events);
        let graph = graph::build(&events, self.reference.as_ref());
        let mismatches = mismatch::detect(&events);
        let timeline = timeline::reduce(&buckets, config.timeline_bound);

        SessionAnalysis {
            source: None,
            line_count: lines.len(),
            events,
            buckets,
            graph,
            mismatches,
            timeline,
        }
    }
}

impl SessionAnalysis {
    /// Total events accounted for by the timeline (shown + suppressed)
    pub fn timeline_accounted(&self) -> usize {
        self.timeline
            .iter()
            .map(|entry| match entry {
                TimelineEntry::Shown {
                    suppressed_count, ..
                } => suppressed_count + 1,
                TimelineEntry::Overflow {
                    suppressed_total, ..
                } => *suppressed_total,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::StaticReference;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(StaticReference::builtin()))
    }

    #[test]
    fn test_empty_input_yields_empty_analysis() {
        let analysis = analyzer()
            .analyze_str("", &AnalyzerConfig::default())
            .unwrap();
        assert!(analysis.events.is_empty());
        assert!(analysis.buckets.is_empty());
        assert!(analysis.graph.nodes.is_empty());
        assert!(analysis.timeline.is_empty());
    }

    #[test]
    fn test_smoke_pipeline() {
        let input = "\
10:00:01 module 7E0 session opened\n\
10:00:02 response 00 00 07 D8 7F 22 31\n\
10:00:03 response 00 00 07 D8 7F 22 31\n";
        let analysis = analyzer()
            .analyze_str(input, &AnalyzerConfig::default())
            .unwrap();

        assert_eq!(analysis.events.len(), 3);
        assert_eq!(analysis.buckets.len(), 2);
        assert_eq!(analysis.timeline_accounted(), 3);
        assert!(analysis.graph.nodes.contains_key(&0x7E0));
    }
}
