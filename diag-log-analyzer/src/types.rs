//! Core types for the diagnostic log analyzer library
//!
//! This module defines the fundamental types flowing through the analysis
//! pipeline: raw input lines, decoded protocol frames, and the canonical
//! diagnostic event that every later stage consumes. The pipeline is a pure
//! transformation - each stage reads the previous stage's output and owns no
//! shared mutable state.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors that can occur during analysis
///
/// Undecodable frames and reference-table misses are deliberately NOT errors:
/// they are represented as data ("unknown") and flow through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Input exceeds configured {unit} limit: {actual} (limit {limit})")]
    ResourceLimitExceeded {
        unit: &'static str,
        actual: u64,
        limit: u64,
    },
}

/// Source format of a raw input line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Flattened from an XML element (text content plus attribute values)
    Xml,
    /// Plain text line
    Text,
}

/// One unit of input: a text line, or one XML element flattened to text.
///
/// Immutable once read; created during ingestion, consumed by the line
/// classifier, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number in the source file
    pub line_number: usize,
    /// Raw text content
    pub text: String,
    /// Detected source format
    pub format: SourceFormat,
}

impl RawLine {
    pub fn text(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
            format: SourceFormat::Text,
        }
    }

    pub fn xml(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
            format: SourceFormat::Xml,
        }
    }
}

/// Normalised severity of a diagnostic event, inferred from keywords and
/// response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// True for severities counted as failures in the module graph
    pub fn is_failure(self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

/// Category of a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Communication,
    ProgrammingAction,
    Validation,
    Configuration,
    Dtc,
    Generic,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Communication => "communication",
            EventKind::ProgrammingAction => "programming",
            EventKind::Validation => "validation",
            EventKind::Configuration => "configuration",
            EventKind::Dtc => "dtc",
            EventKind::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Decoded protocol frame
///
/// Decoding never fails fatally: a token with an odd hex-digit count or fewer
/// than 3 bytes is represented with `undecodable = true` and whatever bytes
/// were recovered, never silently dropped. Downstream stages treat absent
/// fields as "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Raw addressing header bytes (first N bytes of the token)
    pub address_bytes: Vec<u8>,
    /// Service id, absent when too few bytes were available
    pub service_id: Option<u8>,
    /// True iff the byte after the address bytes is the negative-response marker
    pub is_negative_response: bool,
    /// Negative response code, present only for negative responses
    pub response_code: Option<u8>,
    /// Remaining bytes after service/response fields
    pub payload: Vec<u8>,
    /// True when the token could not be decoded as a well-formed frame
    pub undecodable: bool,
}

/// The canonical unit after classification.
///
/// Ordering by `index` (source position) is preserved throughout the pipeline
/// and is the sole ordering key - timestamps are advisory and may be missing
/// or non-monotonic due to clock resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Position in the event stream (source order)
    pub index: usize,
    /// 1-based line number of the originating raw line
    pub line_number: usize,
    /// Wall-clock time of day, absent for bench sessions
    pub timestamp: Option<NaiveTime>,
    /// Primary module (ECU) address referenced by the event
    pub module_address: Option<u16>,
    /// Second address when the line references a source/target pair
    pub peer_address: Option<u16>,
    /// Decoded protocol frame embedded in the line, if any
    pub frame: Option<Frame>,
    pub severity: Severity,
    pub kind: EventKind,
    /// Original text retained for display and debugging
    pub raw_text: String,
}

/// Format a module address the way session logs print them ("7E0", "726")
pub fn format_address(address: u16) -> String {
    format!("{:X}", address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_failure_classes() {
        assert!(Severity::Error.is_failure());
        assert!(Severity::Critical.is_failure());
        assert!(!Severity::Warning.is_failure());
        assert!(!Severity::Success.is_failure());
        assert!(!Severity::Info.is_failure());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Error), "ERROR");
        assert_eq!(format!("{}", Severity::Success), "SUCCESS");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(0x7E0), "7E0");
        assert_eq!(format_address(0x726), "726");
        assert_eq!(format_address(0x01), "1");
    }
}
