//! Diagnostic Session Log Analyzer Library
//!
//! A stateless, reusable library for condensing free-form automotive
//! diagnostic session logs (mixed XML and plain text) into a structured
//! summary: which modules communicated, which failed, which software
//! identifiers are out of date, and a minimal timeline explaining the
//! session outcome.
//!
//! # Architecture
//!
//! The pipeline is a strict one-pass DAG; every stage is a pure
//! transformation over the previous stage's output:
//!
//! - Ingestion normalizes text lines and flattened XML elements into raw
//!   lines (malformed XML falls back to plain-text scanning)
//! - The line classifier extracts timestamps, embedded protocol frames,
//!   severity keywords and module addresses into diagnostic events
//! - The bucketing engine collapses repeated noise into representative
//!   buckets in first-occurrence order
//! - The module graph builder tracks who talked to whom and flags required
//!   dependency modules that never appeared
//! - The mismatch detector reports out-of-date software identifiers
//! - The timeline reducer bounds the output to the entries that explain
//!   the outcome
//!
//! The library does NOT format reports, talk to vehicles, or call any
//! enrichment service - all of that is application-layer responsibility.
//!
//! # Example Usage
//!
//! ```no_run
//! use diag_log_analyzer::{Analyzer, AnalyzerConfig, StaticReference};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let analyzer = Analyzer::new(Arc::new(StaticReference::builtin()));
//! let config = AnalyzerConfig::new().with_timeline_bound(8);
//!
//! let analysis = analyzer
//!     .analyze_file(Path::new("session.log"), &config)
//!     .unwrap();
//!
//! for bucket in &analysis.buckets {
//!     println!("x{} {}", bucket.count, bucket.representative.raw_text);
//! }
//! ```

// Public modules
pub mod analyzer;
pub mod bucket;
pub mod classify;
pub mod config;
pub mod frame;
pub mod graph;
pub mod ingest;
pub mod mismatch;
pub mod reference;
pub mod stream;
pub mod timeline;
pub mod types;

// Re-export main types for convenience
pub use analyzer::{Analyzer, SessionAnalysis};
pub use bucket::{Bucket, Signature};
pub use config::AnalyzerConfig;
pub use graph::{FindingSeverity, MissingDependency, ModuleGraph, ModuleNode};
pub use mismatch::MismatchEntry;
pub use reference::{ModuleInfo, ModuleReference, StaticReference};
pub use timeline::TimelineEntry;
pub use types::{
    AnalyzerError, DiagnosticEvent, EventKind, Frame, RawLine, Result, Severity, SourceFormat,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can build an analyzer over the builtin table
        let analyzer = Analyzer::new(Arc::new(StaticReference::builtin()));
        let analysis = analyzer
            .analyze_str("10:00:00 module 7E0 ready", &AnalyzerConfig::new())
            .unwrap();
        assert_eq!(analysis.events.len(), 1);
    }
}
