//! Software identifier mismatch detection
//!
//! Correlates "current" and "target" identifier/version pairs observed in
//! configuration and communication events, keyed by identifier code.
//!
//! Convention, preserved exactly: the CURRENT value is what the log shows as
//! presently resident on the module; the TARGET value is what the pending
//! flash action would install. Entries where current == target are not
//! mismatches and are dropped.

use crate::classify::patterns::{CURRENT_CUE, TARGET_CUE, VERSION_TOKEN};
use crate::classify::patterns::extract_identifier;
use crate::types::{DiagnosticEvent, EventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An out-of-date identifier, unique by the full triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchEntry {
    pub identifier_code: String,
    /// Value presently resident on the module
    pub current_value: String,
    /// Value the pending action would install
    pub target_value: String,
    /// Number of raw observations of this exact triple
    pub occurrence_count: usize,
}

/// Scan the event stream for identifier/version mismatches.
///
/// A single event may carry both values; a current and a target observed in
/// two separate events sharing the identifier code also pair up. Repeats of
/// the same `(identifier, current, target)` triple increment the occurrence
/// count instead of creating duplicates; first-seen order is preserved.
pub fn detect(events: &[DiagnosticEvent]) -> Vec<MismatchEntry> {
    let mut entries: Vec<MismatchEntry> = Vec::new();
    let mut index_of: HashMap<(String, String, String), usize> = HashMap::new();
    // One partially observed pair per identifier, filled across events
    let mut pending: HashMap<String, PendingPair> = HashMap::new();

    for event in events {
        if !matches!(
            event.kind,
            EventKind::Configuration | EventKind::Communication
        ) {
            continue;
        }
        let Some(identifier) = extract_identifier(&event.raw_text) else {
            continue;
        };
        let Some(observation) = observe_values(&event.raw_text) else {
            continue;
        };

        let pair = pending.entry(identifier.clone()).or_default();
        pair.fold(observation);

        if let (Some(current), Some(target)) = (&pair.current, &pair.target) {
            if current == target {
                continue;
            }
            let key = (identifier.clone(), current.clone(), target.clone());
            match index_of.get(&key) {
                Some(&i) => entries[i].occurrence_count += 1,
                None => {
                    index_of.insert(key, entries.len());
                    entries.push(MismatchEntry {
                        identifier_code: identifier.clone(),
                        current_value: current.clone(),
                        target_value: target.clone(),
                        occurrence_count: 1,
                    });
                }
            }
        }
    }

    log::debug!("Detected {} identifier mismatches", entries.len());
    entries
}

#[derive(Default)]
struct PendingPair {
    current: Option<String>,
    target: Option<String>,
}

impl PendingPair {
    fn fold(&mut self, observation: Observation) {
        if let Some(current) = observation.current {
            self.current = Some(current);
        }
        if let Some(target) = observation.target {
            self.target = Some(target);
        }
    }
}

struct Observation {
    current: Option<String>,
    target: Option<String>,
}

/// Extract labeled version values from one event's text.
///
/// Cue words assign sides; with no cues but exactly two version tokens, the
/// positional convention applies: first is current, second is target.
fn observe_values(text: &str) -> Option<Observation> {
    let versions: Vec<(usize, String)> = VERSION_TOKEN
        .find_iter(text)
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect();
    if versions.is_empty() {
        return None;
    }

    let current_cue = CURRENT_CUE.find(text).map(|m| m.end());
    let target_cue = TARGET_CUE.find(text).map(|m| m.end());

    let value_after = |cue_end: usize| {
        versions
            .iter()
            .find(|(start, _)| *start >= cue_end)
            .map(|(_, v)| v.clone())
    };

    let current = current_cue.and_then(value_after);
    let target = target_cue.and_then(value_after);

    if current.is_some() || target.is_some() {
        return Some(Observation { current, target });
    }

    // No cues: positional fallback within a single event
    if versions.len() == 2 {
        return Some(Observation {
            current: Some(versions[0].1.clone()),
            target: Some(versions[1].1.clone()),
        });
    }

    None
}
