//! Pattern tables for line classification
//!
//! Every text heuristic used by the classifier lives here as a named,
//! compiled, individually tested pattern. Classification behavior is the sum
//! of these tables, evaluated in fixed priority order - new log dialects are
//! supported by extending the tables, not by scattering string matches.

use crate::types::Severity;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Time-of-day, optionally with fractional seconds ("14:03:27.512")
pub static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2}):(\d{2}):(\d{2})(?:[.,](\d{1,6}))?\b").unwrap()
});

/// Run of hex byte pairs separated by whitespace, at least 3 bytes long -
/// the wire-frame shape session logs embed in free text
pub static HEX_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[0-9A-Fa-f]{2}[ \t]+){2,}[0-9A-Fa-f]{2}\b").unwrap()
});

/// Candidate module address token: 3 or 4 hex digits. Candidates are
/// validated against the reference table's plausibility predicate before use.
pub static ADDRESS_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9A-Fa-f]{3,4}\b").unwrap());

/// Diagnostic trouble code: one letter followed by four digits ("P0420")
pub static DTC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z]\d{4}\b").unwrap());

/// Identifier code cued by a DID/identifier keyword ("DID F188")
pub static IDENTIFIER_CUED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:DID|identifier)\s*:?\s*([0-9A-Fa-f]{4})\b").unwrap()
});

/// Bare 4-hex-digit identifier candidate; accepted only when it carries a
/// hex letter, to avoid colliding with years and counters
pub static IDENTIFIER_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9A-Fa-f]{4}\b").unwrap());

/// Version-like value: a dash-separated part number with at least two
/// dashes ("SL3T-14C026-AE") or a dotted version ("4.2.1")
pub static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9A-Za-z]{2,}(?:-[0-9A-Za-z]+){2,}\b|\b\d+(?:\.\d+){1,3}\b").unwrap()
});

/// Cue words marking the value presently resident on the module
pub static CURRENT_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:current|actual|installed|present|existing)\b").unwrap()
});

/// Cue words marking the value a pending action would install
pub static TARGET_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:target|expected|new|pending|latest)\b").unwrap()
});

/// Any token containing a decimal digit - the variable substrings (hex runs,
/// addresses, counters) elided when deriving a bucket message template
pub static VARIABLE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9A-Fa-f]*[0-9][0-9A-Fa-f]*\b").unwrap());

/// Keyword-to-severity table, matched case-insensitively as substrings in
/// listed priority order. First match wins.
pub const SEVERITY_KEYWORDS: &[(&str, Severity)] = &[
    ("error", Severity::Error),
    ("fail", Severity::Error),
    ("fault", Severity::Error),
    ("success", Severity::Success),
    ("pass", Severity::Success),
    ("complete", Severity::Success),
    ("warn", Severity::Warning),
    ("critical", Severity::Critical),
    ("fatal", Severity::Critical),
];

/// Look up the first matching severity keyword, if any
pub fn severity_keyword(text: &str) -> Option<Severity> {
    let lower = text.to_lowercase();
    SEVERITY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, severity)| *severity)
}

/// Extract the first time-of-day token as a [`NaiveTime`]
pub fn extract_timestamp(text: &str) -> Option<NaiveTime> {
    let caps = TIMESTAMP.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps[3].parse().ok()?;
    let micros = caps
        .get(4)
        .map(|frac| {
            let mut digits = frac.as_str().to_string();
            while digits.len() < 6 {
                digits.push('0');
            }
            digits[..6].parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0);
    NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
}

/// Extract the first identifier code, preferring DID-cued tokens and falling
/// back to bare 4-hex tokens that carry a hex letter
pub fn extract_identifier(text: &str) -> Option<String> {
    if let Some(caps) = IDENTIFIER_CUED.captures(text) {
        return Some(caps[1].to_uppercase());
    }
    IDENTIFIER_BARE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| token.chars().any(|c| c.is_ascii_alphabetic()))
        .map(|token| token.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_extraction() {
        assert_eq!(
            extract_timestamp("14:03:27.512 session opened"),
            NaiveTime::from_hms_micro_opt(14, 3, 27, 512_000)
        );
        assert_eq!(
            extract_timestamp("2024-05-01 09:15:00 boot"),
            NaiveTime::from_hms_opt(9, 15, 0)
        );
        assert_eq!(extract_timestamp("no time here"), None);
        // 25:00:00 is not a valid time of day
        assert_eq!(extract_timestamp("25:00:00"), None);
    }

    #[test]
    fn test_hex_run_matches_spaced_pairs_only() {
        assert!(HEX_RUN.is_match("00 00 07 D8 7F 22 31"));
        assert!(HEX_RUN.is_match("sent 07 E0 22 F1 88 ok"));
        // Two bytes are below the 3-byte floor
        assert!(!HEX_RUN.is_match("7F 22"));
        // Part numbers must not be mistaken for frames
        assert!(!HEX_RUN.is_match("current SL3T-14C026-AE"));
    }

    #[test]
    fn test_severity_keyword_priority() {
        assert_eq!(severity_keyword("Request FAILED"), Some(Severity::Error));
        assert_eq!(severity_keyword("routine passed"), Some(Severity::Success));
        assert_eq!(severity_keyword("low voltage warning"), Some(Severity::Warning));
        assert_eq!(severity_keyword("FATAL: bus off"), Some(Severity::Critical));
        assert_eq!(severity_keyword("reading identifiers"), None);
        // "fail" outranks "critical" per table order
        assert_eq!(
            severity_keyword("critical step failed"),
            Some(Severity::Error)
        );
    }

    #[test]
    fn test_dtc_token() {
        assert!(DTC_TOKEN.is_match("stored DTC P0420 confirmed"));
        assert!(DTC_TOKEN.is_match("U0100 lost communication"));
        assert!(!DTC_TOKEN.is_match("module 7E0 responded"));
    }

    #[test]
    fn test_identifier_extraction() {
        assert_eq!(
            extract_identifier("DID F188 read"),
            Some("F188".to_string())
        );
        assert_eq!(
            extract_identifier("identifier: 8061 updated"),
            Some("8061".to_string())
        );
        // Bare tokens need a hex letter to avoid matching years
        assert_eq!(
            extract_identifier("version F16A mismatch"),
            Some("F16A".to_string())
        );
        assert_eq!(extract_identifier("built in 2024"), None);
    }

    #[test]
    fn test_version_token() {
        assert!(VERSION_TOKEN.is_match("SL3T-14C026-AE"));
        assert!(VERSION_TOKEN.is_match("strategy 4.2.1"));
        // Single-dash tokens like NRC-31 are not versions
        assert!(!VERSION_TOKEN.is_match("NRC-31"));
    }

    #[test]
    fn test_cue_words() {
        assert!(CURRENT_CUE.is_match("Current level: SL3T-14C026-AE"));
        assert!(TARGET_CUE.is_match("target level SL3T-14C026-AF"));
        assert!(!CURRENT_CUE.is_match("concurrent sessions"));
    }
}
