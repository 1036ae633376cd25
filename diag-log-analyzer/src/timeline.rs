//! Timeline reduction
//!
//! Selects the minimal ordered subset of buckets sufficient to explain the
//! session outcome: the first K buckets verbatim (each with its suppressed
//! repeat count), then one trailing synthetic entry accounting for every
//! event past the bound. Suppressed counts sum so that every event is
//! accounted for exactly once.

use crate::bucket::Bucket;
use crate::types::DiagnosticEvent;
use serde::{Deserialize, Serialize};

/// One entry of the reduced timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEntry {
    /// A bucket shown verbatim through its representative event
    Shown {
        event: DiagnosticEvent,
        /// Events of the same signature collapsed after the first shown
        suppressed_count: usize,
    },
    /// Trailing marker summarizing all buckets past the bound
    Overflow {
        /// Total count of all further events
        suppressed_total: usize,
        /// Number of distinct buckets summarized
        bucket_count: usize,
    },
}

/// Reduce buckets (in first-occurrence order) to at most `bound + 1` entries
pub fn reduce(buckets: &[Bucket], bound: usize) -> Vec<TimelineEntry> {
    let mut timeline: Vec<TimelineEntry> = buckets
        .iter()
        .take(bound)
        .map(|bucket| TimelineEntry::Shown {
            event: bucket.representative.clone(),
            suppressed_count: bucket.count - 1,
        })
        .collect();

    if buckets.len() > bound {
        let rest = &buckets[bound..];
        timeline.push(TimelineEntry::Overflow {
            suppressed_total: rest.iter().map(|b| b.count).sum(),
            bucket_count: rest.len(),
        });
    }

    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{bucketize, Signature};
    use crate::types::{EventKind, Severity};

    fn event(index: usize, text: &str) -> DiagnosticEvent {
        DiagnosticEvent {
            index,
            line_number: index + 1,
            timestamp: None,
            module_address: None,
            peer_address: None,
            frame: None,
            severity: Severity::Info,
            kind: EventKind::Generic,
            raw_text: text.to_string(),
        }
    }

    fn buckets_of(texts: &[&str]) -> Vec<Bucket> {
        let events: Vec<DiagnosticEvent> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| event(i, t))
            .collect();
        bucketize(&events)
    }

    #[test]
    fn test_burst_suppression() {
        let texts: Vec<&str> = std::iter::repeat("negative response code 31").take(40).collect();
        let timeline = reduce(&buckets_of(&texts), 8);

        assert_eq!(timeline.len(), 1);
        match &timeline[0] {
            TimelineEntry::Shown {
                suppressed_count, ..
            } => assert_eq!(*suppressed_count, 39),
            _ => panic!("expected shown entry"),
        }
    }

    #[test]
    fn test_bound_with_overflow() {
        // 12 distinct buckets, bound 8: 8 shown + 1 overflow covering 4
        let texts = [
            "open session", "seed request", "seed response", "unlock granted",
            "erase block", "transfer block", "transfer exit", "checksum request",
            "reset request", "reset confirmed", "session closed", "log flushed",
        ];
        let buckets = buckets_of(&texts);
        assert_eq!(buckets.len(), 12);

        let timeline = reduce(&buckets, 8);
        assert_eq!(timeline.len(), 9);
        match timeline.last().unwrap() {
            TimelineEntry::Overflow {
                suppressed_total,
                bucket_count,
            } => {
                assert_eq!(*suppressed_total, 4);
                assert_eq!(*bucket_count, 4);
            }
            _ => panic!("expected overflow entry"),
        }
    }

    #[test]
    fn test_every_event_accounted_once() {
        let texts = [
            "alpha step", "alpha step", "beta step", "gamma step", "alpha step",
            "delta step", "epsilon step", "zeta step", "eta step", "theta step",
            "iota step", "kappa step",
        ];
        let buckets = buckets_of(&texts);
        let timeline = reduce(&buckets, 8);

        let accounted: usize = timeline
            .iter()
            .map(|entry| match entry {
                TimelineEntry::Shown {
                    suppressed_count, ..
                } => suppressed_count + 1,
                TimelineEntry::Overflow {
                    suppressed_total, ..
                } => *suppressed_total,
            })
            .sum();
        assert_eq!(accounted, texts.len());
    }

    #[test]
    fn test_under_bound_has_no_overflow() {
        let timeline = reduce(&buckets_of(&["one thing", "another thing"]), 8);
        assert_eq!(timeline.len(), 2);
        assert!(timeline
            .iter()
            .all(|e| matches!(e, TimelineEntry::Shown { .. })));
    }

    #[test]
    fn test_signature_orders_match_first_occurrence() {
        let buckets = buckets_of(&["first kind", "second kind", "first kind"]);
        let timeline = reduce(&buckets, 8);
        match &timeline[0] {
            TimelineEntry::Shown { event, .. } => assert_eq!(event.index, 0),
            _ => panic!("expected shown entry"),
        }
        // Signatures derived once stay stable across the pipeline
        let sig = Signature::of(&event(0, "first kind"));
        assert_eq!(sig.message_template, "first kind");
    }
}
