//! Optional enrichment collaborator
//!
//! The analysis report can be annotated with free-text commentary from an
//! external service. The collaborator is selected once at startup from
//! configuration presence: with no command configured it is `Unavailable`
//! and every call is a no-op, so the pipeline never branches on "is the
//! service set up" anywhere else. Any failure - spawn error, non-zero exit,
//! unusable output - degrades to a skipped-enrichment marker, never to a
//! pipeline failure.

use crate::config::EnrichmentConfig;
use diag_log_analyzer::SessionAnalysis;
use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// Outcome of one enrichment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// Commentary returned by the collaborator
    Commentary { text: String },
    /// Enrichment skipped; the report is complete without it
    Skipped { reason: String },
}

/// Capability-gated enrichment collaborator
pub enum Enrichment {
    Available(CommandEnricher),
    Unavailable,
}

impl Enrichment {
    /// Select the variant once at startup from configuration presence
    pub fn from_config(config: &EnrichmentConfig) -> Self {
        match &config.command {
            Some(command) if !command.trim().is_empty() => {
                log::info!("Enrichment command configured: {}", command);
                Enrichment::Available(CommandEnricher {
                    command: command.clone(),
                })
            }
            _ => {
                log::debug!("No enrichment command configured");
                Enrichment::Unavailable
            }
        }
    }

    /// Annotate one analysis. Never fails; the worst case is a skip marker.
    pub fn enrich(&self, analysis: &SessionAnalysis) -> EnrichmentOutcome {
        match self {
            Enrichment::Unavailable => EnrichmentOutcome::Skipped {
                reason: "not configured".to_string(),
            },
            Enrichment::Available(enricher) => enricher.run(analysis),
        }
    }
}

/// Pipes the JSON analysis to an external command and captures its stdout
pub struct CommandEnricher {
    command: String,
}

impl CommandEnricher {
    fn run(&self, analysis: &SessionAnalysis) -> EnrichmentOutcome {
        let payload = match serde_json::to_vec(analysis) {
            Ok(payload) => payload,
            Err(e) => return skipped(format!("serialization failed: {}", e)),
        };

        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            return skipped("empty command".to_string());
        };

        let child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(e) => return skipped(format!("spawn failed: {}", e)),
        };

        if let Some(stdin) = child.stdin.take() {
            let mut stdin = stdin;
            if let Err(e) = stdin.write_all(&payload) {
                let _ = child.kill();
                let _ = child.wait();
                return skipped(format!("write failed: {}", e));
            }
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => return skipped(format!("wait failed: {}", e)),
        };
        if !output.status.success() {
            return skipped(format!("command exited with {}", output.status));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return skipped("command produced no commentary".to_string());
        }
        EnrichmentOutcome::Commentary { text }
    }
}

fn skipped(reason: String) -> EnrichmentOutcome {
    log::warn!("Enrichment skipped: {}", reason);
    EnrichmentOutcome::Skipped { reason }
}
