//! Log ingestion and normalization
//!
//! Reads a captured session log and normalizes it into [`RawLine`] units.
//! Input is mixed: some tools capture plain text, others wrap the session in
//! an XML document. XML elements are flattened to their text content plus
//! attribute values; a document that cannot be parsed as XML at all is
//! recovered by re-scanning the same bytes as plain text lines, so malformed
//! input is never fatal.
//!
//! The only hard failure is a configured size ceiling: exceeding it fails
//! the whole file with `ResourceLimitExceeded` rather than truncating
//! silently.

use crate::config::AnalyzerConfig;
use crate::types::{AnalyzerError, RawLine, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

/// Read a log file and normalize it into raw lines.
///
/// Bytes are decoded as UTF-8 with a Latin-1 fallback - diagnostic tools
/// commonly emit Windows-1252 status text.
pub fn read_file(path: &Path, config: &AnalyzerConfig) -> Result<Vec<RawLine>> {
    log::info!("Reading log file: {:?}", path);

    let bytes = std::fs::read(path)?;
    if let Some(limit) = config.max_bytes {
        if bytes.len() as u64 > limit {
            return Err(AnalyzerError::ResourceLimitExceeded {
                unit: "byte",
                actual: bytes.len() as u64,
                limit,
            });
        }
    }

    let content = String::from_utf8(bytes).unwrap_or_else(|e| {
        log::warn!("Log file is not UTF-8, falling back to Latin-1");
        e.into_bytes().iter().map(|&b| b as char).collect()
    });

    ingest_str(&content, config)
}

/// Normalize an in-memory log into raw lines
pub fn ingest_str(input: &str, config: &AnalyzerConfig) -> Result<Vec<RawLine>> {
    if let Some(limit) = config.max_bytes {
        if input.len() as u64 > limit {
            return Err(AnalyzerError::ResourceLimitExceeded {
                unit: "byte",
                actual: input.len() as u64,
                limit,
            });
        }
    }

    if looks_like_xml(input) {
        match flatten_xml(input, config) {
            Ok(lines) => return Ok(lines),
            Err(AnalyzerError::ResourceLimitExceeded { unit, actual, limit }) => {
                return Err(AnalyzerError::ResourceLimitExceeded { unit, actual, limit });
            }
            Err(e) => {
                // Malformed XML recovers as plain text
                log::warn!("XML parse failed ({}), falling back to text scan", e);
            }
        }
    }

    text_lines(input, config)
}

fn looks_like_xml(input: &str) -> bool {
    input.trim_start().starts_with('<')
}

fn check_line_limit(count: usize, config: &AnalyzerConfig) -> Result<()> {
    if let Some(limit) = config.max_lines {
        if count > limit {
            return Err(AnalyzerError::ResourceLimitExceeded {
                unit: "line",
                actual: count as u64,
                limit: limit as u64,
            });
        }
    }
    Ok(())
}

/// Plain-text scan: one RawLine per non-blank source line
fn text_lines(input: &str, config: &AnalyzerConfig) -> Result<Vec<RawLine>> {
    let mut lines = Vec::new();
    for (number, text) in input.lines().enumerate() {
        check_line_limit(number + 1, config)?;
        if text.trim().is_empty() {
            continue;
        }
        lines.push(RawLine::text(number + 1, text));
    }
    log::debug!("Ingested {} text lines", lines.len());
    Ok(lines)
}

/// Flatten an XML document into one RawLine per element carrying content.
///
/// Element text and attribute values become the line text; the tag path is
/// context only and never part of event identity, so it stays out of the
/// flattened text.
fn flatten_xml(input: &str, config: &AnalyzerConfig) -> Result<Vec<RawLine>> {
    let mut reader = Reader::from_str(input);

    // (start line, accumulated text) per open element
    let mut stack: Vec<(usize, String)> = Vec::new();
    let mut lines: Vec<RawLine> = Vec::new();
    let mut tracker = LineTracker::new(input);

    loop {
        let event = reader
            .read_event()
            .map_err(|e| AnalyzerError::MalformedInput(e.to_string()))?;
        let line_number = tracker.line_at(reader.buffer_position() as usize);

        match event {
            Event::Start(ref e) => {
                let mut text = String::new();
                append_attribute_values(e, &mut text);
                stack.push((line_number, text));
            }
            Event::Empty(ref e) => {
                let mut text = String::new();
                append_attribute_values(e, &mut text);
                push_flattened(&mut lines, line_number, text, config)?;
            }
            Event::Text(ref t) => {
                let content = t
                    .unescape()
                    .map_err(|e| AnalyzerError::MalformedInput(e.to_string()))?;
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Some((_, text)) = stack.last_mut() {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(trimmed);
                }
            }
            Event::End(_) => {
                if let Some((start_line, text)) = stack.pop() {
                    push_flattened(&mut lines, start_line, text, config)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("Flattened {} XML elements", lines.len());
    Ok(lines)
}

fn append_attribute_values(e: &quick_xml::events::BytesStart<'_>, text: &mut String) {
    for attr in e.attributes().flatten() {
        if let Ok(value) = attr.unescape_value() {
            if !value.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&value);
            }
        }
    }
}

fn push_flattened(
    lines: &mut Vec<RawLine>,
    line_number: usize,
    text: String,
    config: &AnalyzerConfig,
) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    check_line_limit(lines.len() + 1, config)?;
    lines.push(RawLine::xml(line_number, text));
    Ok(())
}

/// Incrementally maps byte offsets to 1-based line numbers
struct LineTracker<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let end = offset.min(self.input.len());
        while self.offset < end {
            if self.input[self.offset] == b'\n' {
                self.line += 1;
            }
            self.offset += 1;
        }
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceFormat;
    use std::io::Write;

    #[test]
    fn test_text_ingestion_skips_blank_lines() {
        let config = AnalyzerConfig::default();
        let lines = ingest_str("first line\n\n   \nsecond line\n", &config).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_number, 1);
        assert_eq!(lines[0].text, "first line");
        assert_eq!(lines[1].line_number, 4);
        assert_eq!(lines[1].format, SourceFormat::Text);
    }

    #[test]
    fn test_xml_flattening() {
        let config = AnalyzerConfig::default();
        let input = r#"<?xml version="1.0"?>
<session>
  <entry time="10:21:33">Module 7E0 responded</entry>
  <entry severity="error">NRC-31 on DID 8061</entry>
  <status code="0"/>
</session>"#;
        let lines = ingest_str(input, &config).unwrap();

        assert!(lines.iter().all(|l| l.format == SourceFormat::Xml));
        assert!(lines
            .iter()
            .any(|l| l.text.contains("10:21:33") && l.text.contains("Module 7E0 responded")));
        assert!(lines
            .iter()
            .any(|l| l.text.contains("error") && l.text.contains("NRC-31")));
        assert!(lines.iter().any(|l| l.text == "0"));
    }

    #[test]
    fn test_malformed_xml_falls_back_to_text() {
        let config = AnalyzerConfig::default();
        let input = "<session>\n<unclosed attr=\"oops\n10:00:00 Module 7E0 failed\n";
        let lines = ingest_str(input, &config).unwrap();

        // Recovered as plain text lines, never fatal
        assert!(lines.iter().all(|l| l.format == SourceFormat::Text));
        assert!(lines.iter().any(|l| l.text.contains("Module 7E0 failed")));
    }

    #[test]
    fn test_line_ceiling() {
        let config = AnalyzerConfig::new().with_max_lines(2);
        let err = ingest_str("a 1\nb 2\nc 3\n", &config).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::ResourceLimitExceeded { unit: "line", .. }
        ));
    }

    #[test]
    fn test_byte_ceiling() {
        let config = AnalyzerConfig::new().with_max_bytes(8);
        let err = ingest_str("far too many bytes here\n", &config).unwrap_err();
        assert!(matches!(
            err,
            AnalyzerError::ResourceLimitExceeded { unit: "byte", .. }
        ));
    }

    #[test]
    fn test_read_file_latin1_fallback() {
        let config = AnalyzerConfig::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // 0xE9 is 'é' in Latin-1 and invalid standalone UTF-8
        file.write_all(b"10:00:00 module 7E0 pr\xE9sent\n").unwrap();

        let lines = read_file(file.path(), &config).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.contains("pr\u{e9}sent"));
    }
}
