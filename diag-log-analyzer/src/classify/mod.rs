//! Line classification
//!
//! Turns one [`RawLine`] into at most one [`DiagnosticEvent`]. Extraction
//! rules run in fixed priority order: timestamp, embedded hex frame, severity
//! keywords, module address tokens. A line yielding none of those carries no
//! diagnostic content and is dropped.

pub mod patterns;

use crate::config::{is_programming_service, AnalyzerConfig};
use crate::frame;
use crate::reference::ModuleReference;
use crate::types::{DiagnosticEvent, EventKind, Frame, RawLine, Severity};

/// Classify a raw line into a diagnostic event, or `None` when the line has
/// no diagnostic content.
///
/// The returned event's `index` is 0; the event stream builder assigns the
/// final source-order index.
pub fn classify(
    line: &RawLine,
    reference: &dyn ModuleReference,
    config: &AnalyzerConfig,
) -> Option<DiagnosticEvent> {
    let text = line.text.as_str();

    let timestamp = patterns::extract_timestamp(text);

    // Timestamp digits and embedded wire frames are removed from the text
    // before token scans so they are not re-read as addresses or identifiers
    let masked = mask_pattern(text, &patterns::TIMESTAMP);
    let (frame, masked) = extract_frame(&masked, config);

    let keyword_severity = patterns::severity_keyword(text);
    let (module_address, peer_address) = extract_addresses(&masked, reference);

    if timestamp.is_none()
        && frame.is_none()
        && keyword_severity.is_none()
        && module_address.is_none()
        && !has_mismatch_shape(&masked)
    {
        log::trace!("Dropping line {} (no diagnostic content)", line.line_number);
        return None;
    }

    // A negative response is a failure even when the surrounding text
    // carries no severity keyword
    let severity = match keyword_severity {
        Some(severity) => severity,
        None if frame.as_ref().is_some_and(|f| f.is_negative_response) => Severity::Error,
        None => Severity::Info,
    };

    // Frames address a module through their header even when the free text
    // names none
    let module_address =
        module_address.or_else(|| frame.as_ref().and_then(|f| f.derived_address()));

    let kind = infer_kind(&masked, frame.as_ref(), module_address, peer_address);

    Some(DiagnosticEvent {
        index: 0,
        line_number: line.line_number,
        timestamp,
        module_address,
        peer_address,
        frame,
        severity,
        kind,
        raw_text: line.text.clone(),
    })
}

/// Extract and decode the first embedded hex run; returns the decoded frame
/// and the line text with the run blanked out.
fn extract_frame(text: &str, config: &AnalyzerConfig) -> (Option<Frame>, String) {
    match patterns::HEX_RUN.find(text) {
        Some(m) => {
            let decoded = frame::decode(m.as_str(), config);
            (Some(decoded), blank_range(text, m.start(), m.end()))
        }
        None => (None, text.to_string()),
    }
}

/// Blank every match of `pattern` out of `text`, preserving offsets
fn mask_pattern(text: &str, pattern: &regex::Regex) -> String {
    pattern
        .replace_all(text, |caps: &regex::Captures| " ".repeat(caps[0].len()))
        .into_owned()
}

fn blank_range(text: &str, start: usize, end: usize) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.extend(std::iter::repeat(' ').take(end - start));
    out.push_str(&text[end..]);
    out
}

/// Scan for up to two distinct plausible module addresses (source/target)
fn extract_addresses(
    masked: &str,
    reference: &dyn ModuleReference,
) -> (Option<u16>, Option<u16>) {
    let mut first: Option<u16> = None;
    let mut second: Option<u16> = None;

    for m in patterns::ADDRESS_TOKEN.find_iter(masked) {
        let token = m.as_str();
        let Ok(value) = u16::from_str_radix(token, 16) else {
            continue;
        };
        if !reference.is_plausible_address(token, value) {
            continue;
        }
        match first {
            None => first = Some(value),
            Some(existing) if existing != value && second.is_none() => {
                second = Some(value);
                break;
            }
            _ => {}
        }
    }

    (first, second)
}

/// Kind inference, in priority order
fn infer_kind(
    masked: &str,
    frame: Option<&Frame>,
    module_address: Option<u16>,
    peer_address: Option<u16>,
) -> EventKind {
    let lower = masked.to_lowercase();

    if frame
        .and_then(|f| f.service_id)
        .is_some_and(is_programming_service)
    {
        return EventKind::ProgrammingAction;
    }
    if lower.contains("validat") {
        return EventKind::Validation;
    }
    if patterns::DTC_TOKEN.is_match(masked) {
        return EventKind::Dtc;
    }
    if lower.contains("config") || has_mismatch_shape(masked) {
        return EventKind::Configuration;
    }
    if module_address.is_some() || peer_address.is_some() {
        return EventKind::Communication;
    }
    EventKind::Generic
}

/// True when the text pairs an identifier code with a version-like value -
/// the shape the mismatch detector consumes
pub fn has_mismatch_shape(text: &str) -> bool {
    patterns::extract_identifier(text).is_some() && patterns::VERSION_TOKEN.is_match(text)
}
