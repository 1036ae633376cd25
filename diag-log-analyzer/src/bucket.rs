//! Deduplication ("bucketing") engine
//!
//! Collapses semantically identical repeated events into buckets. A bucket's
//! signature combines severity, kind, the frame's service and response codes,
//! and the message template - the raw text with variable substrings (hex
//! runs, addresses, counters) elided. Buckets are emitted in order of first
//! occurrence: the order in which a human reading top-to-bottom meets each
//! distinct phenomenon, not a global group-by.

use crate::classify::patterns::VARIABLE_TOKEN;
use crate::types::{DiagnosticEvent, EventKind, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Equality key for bucket membership
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub severity: Severity,
    pub kind: EventKind,
    pub service_id: Option<u8>,
    pub response_code: Option<u8>,
    /// Raw text with every digit-bearing token replaced by a placeholder
    pub message_template: String,
}

impl Signature {
    /// Derive the signature of an event
    pub fn of(event: &DiagnosticEvent) -> Self {
        let (service_id, response_code) = match &event.frame {
            Some(frame) => (frame.service_id, frame.response_code),
            None => (None, None),
        };
        Self {
            severity: event.severity,
            kind: event.kind,
            service_id,
            response_code,
            message_template: message_template(&event.raw_text),
        }
    }
}

/// Elide variable substrings: every token containing a decimal digit (hex
/// runs, addresses, counters) becomes `#`, so "NRC-31 on DID 8061" and
/// "NRC-31 on DID 8060" share one template.
pub fn message_template(text: &str) -> String {
    VARIABLE_TOKEN.replace_all(text, "#").into_owned()
}

/// A deduplicated group of events sharing one signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub signature: Signature,
    /// First event that opened the bucket
    pub representative: DiagnosticEvent,
    /// Number of events folded in
    pub count: usize,
    /// Stream index of the first member
    pub first_index: usize,
    /// Stream index of the most recent member
    pub last_index: usize,
}

/// Fold an ordered event sequence into buckets, greedily in arrival order.
///
/// The first event with a new signature opens a bucket; later events with
/// the same signature increment its count and update `last_index`.
/// Invariant: `sum(bucket.count) == events.len()`.
pub fn bucketize(events: &[DiagnosticEvent]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index_of: HashMap<Signature, usize> = HashMap::new();

    for event in events {
        let signature = Signature::of(event);
        match index_of.get(&signature) {
            Some(&i) => {
                let bucket = &mut buckets[i];
                bucket.count += 1;
                bucket.last_index = event.index;
            }
            None => {
                index_of.insert(signature.clone(), buckets.len());
                buckets.push(Bucket {
                    signature,
                    representative: event.clone(),
                    count: 1,
                    first_index: event.index,
                    last_index: event.index,
                });
            }
        }
    }

    log::debug!("Folded {} events into {} buckets", events.len(), buckets.len());
    buckets
}
