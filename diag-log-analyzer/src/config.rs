//! Analyzer configuration types
//!
//! This module defines the minimal configuration needed by the analyzer
//! library. Presentation concerns (report layout, output paths, enrichment)
//! are handled by the application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Number of leading frame bytes treated as addressing (default: 4,
    /// accommodating both 11-bit and 29-bit style headers)
    #[serde(default = "default_address_bytes")]
    pub address_byte_count: usize,

    /// Marker byte identifying a negative response (default: 0x7F)
    #[serde(default = "default_negative_marker")]
    pub negative_response_marker: u8,

    /// Maximum number of buckets shown verbatim in the reduced timeline
    #[serde(default = "default_timeline_bound")]
    pub timeline_bound: usize,

    /// Optional hard ceiling on input lines per file. Exceeding it fails the
    /// whole file with `ResourceLimitExceeded` rather than truncating.
    #[serde(default)]
    pub max_lines: Option<usize>,

    /// Optional hard ceiling on input bytes per file
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

fn default_address_bytes() -> usize {
    4
}

fn default_negative_marker() -> u8 {
    0x7F
}

fn default_timeline_bound() -> usize {
    8
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            address_byte_count: default_address_bytes(),
            negative_response_marker: default_negative_marker(),
            timeline_bound: default_timeline_bound(),
            max_lines: None,
            max_bytes: None,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of addressing bytes per frame
    pub fn with_address_byte_count(mut self, count: usize) -> Self {
        self.address_byte_count = count;
        self
    }

    /// Builder method: set the timeline bound
    pub fn with_timeline_bound(mut self, bound: usize) -> Self {
        self.timeline_bound = bound;
        self
    }

    /// Builder method: set a line ceiling
    pub fn with_max_lines(mut self, limit: usize) -> Self {
        self.max_lines = Some(limit);
        self
    }

    /// Builder method: set a byte ceiling
    pub fn with_max_bytes(mut self, limit: u64) -> Self {
        self.max_bytes = Some(limit);
        self
    }
}

/// Diagnostic service ids considered part of the programming range.
///
/// Requests carrying one of these ids classify the event as a programming
/// action: RequestDownload (0x34), RequestUpload (0x35), TransferData (0x36),
/// RequestTransferExit (0x37), WriteDataByIdentifier (0x2E) and
/// RoutineControl (0x31).
pub const PROGRAMMING_SERVICES: &[u8] = &[0x34, 0x35, 0x36, 0x37, 0x2E, 0x31];

/// Check whether a service id falls in the programming range
pub fn is_programming_service(service_id: u8) -> bool {
    PROGRAMMING_SERVICES.contains(&service_id)
}
