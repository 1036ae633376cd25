//! Event stream building
//!
//! Pure ordering pass: classifies every raw line in source order, drops the
//! lines with no diagnostic content and assigns each surviving event its
//! stream index. Stateless across calls - the index is the sole ordering key
//! for everything downstream.

use crate::classify;
use crate::config::AnalyzerConfig;
use crate::reference::ModuleReference;
use crate::types::{DiagnosticEvent, RawLine};

/// Build the ordered event sequence from classified raw lines
pub fn build_events(
    lines: &[RawLine],
    reference: &dyn ModuleReference,
    config: &AnalyzerConfig,
) -> Vec<DiagnosticEvent> {
    let mut events = Vec::new();
    for line in lines {
        if let Some(mut event) = classify::classify(line, reference, config) {
            event.index = events.len();
            events.push(event);
        }
    }
    log::debug!(
        "Classified {} events from {} raw lines",
        events.len(),
        lines.len()
    );
    events
}
