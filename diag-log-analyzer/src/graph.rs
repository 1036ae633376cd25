//! Module communication graph
//!
//! Builds the who-talked-to-whom graph from events referencing module
//! addresses, with per-module success/failure tallies, and checks observed
//! peers against the declarative dependency table. The dependency table is
//! read-only external knowledge - nothing is inferred from observed data,
//! and modules without a table entry produce no findings.

use crate::reference::{display_name, ModuleReference};
use crate::types::{DiagnosticEvent, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One ECU participant in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub address: u16,
    /// Resolved via the reference table; generic label on a lookup miss
    pub display_name: String,
    pub total_communications: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Addresses this module exchanged frames with
    pub peers: BTreeSet<u16>,
}

impl ModuleNode {
    fn new(address: u16, reference: &dyn ModuleReference) -> Self {
        Self {
            address,
            display_name: display_name(reference, address),
            total_communications: 0,
            success_count: 0,
            failure_count: 0,
            peers: BTreeSet::new(),
        }
    }

    fn record(&mut self, severity: Severity) {
        self.total_communications += 1;
        match severity {
            Severity::Success => self.success_count += 1,
            s if s.is_failure() => self.failure_count += 1,
            _ => {}
        }
    }
}

/// Severity of a missing-dependency finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    High,
    Medium,
}

/// A required peer that never appeared in a module's observed peer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDependency {
    pub module: u16,
    pub missing_peer: u16,
    pub severity: FindingSeverity,
}

/// The assembled communication graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleGraph {
    /// Nodes keyed by address; BTreeMap keeps output deterministic
    pub nodes: BTreeMap<u16, ModuleNode>,
    pub missing_dependencies: Vec<MissingDependency>,
}

/// Build the communication graph and missing-dependency findings
pub fn build(events: &[DiagnosticEvent], reference: &dyn ModuleReference) -> ModuleGraph {
    let mut nodes: BTreeMap<u16, ModuleNode> = BTreeMap::new();

    for event in events {
        let addresses = [event.module_address, event.peer_address];
        for address in addresses.into_iter().flatten() {
            nodes
                .entry(address)
                .or_insert_with(|| ModuleNode::new(address, reference))
                .record(event.severity);
        }

        // Symmetric peer registration when the line names both ends
        if let (Some(a), Some(b)) = (event.module_address, event.peer_address) {
            if a != b {
                if let Some(node) = nodes.get_mut(&a) {
                    node.peers.insert(b);
                }
                if let Some(node) = nodes.get_mut(&b) {
                    node.peers.insert(a);
                }
            }
        }
    }

    let missing_dependencies = find_missing(&nodes, reference);
    log::debug!(
        "Module graph: {} nodes, {} missing-dependency findings",
        nodes.len(),
        missing_dependencies.len()
    );

    ModuleGraph {
        nodes,
        missing_dependencies,
    }
}

/// Walk the dependency table for every observed module: required peers
/// absent from the observed peer set are findings, High when the missing
/// peer is a declared critical dependency.
fn find_missing(
    nodes: &BTreeMap<u16, ModuleNode>,
    reference: &dyn ModuleReference,
) -> Vec<MissingDependency> {
    let mut findings = Vec::new();

    for node in nodes.values() {
        for &required in reference.required_peers(node.address) {
            if node.peers.contains(&required) {
                continue;
            }
            let severity = match reference.resolve(required) {
                Some(info) if info.is_critical_dependency => FindingSeverity::High,
                _ => FindingSeverity::Medium,
            };
            findings.push(MissingDependency {
                module: node.address,
                missing_peer: required,
                severity,
            });
        }
    }

    findings
}
