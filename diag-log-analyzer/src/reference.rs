//! Module reference collaborator
//!
//! External knowledge about modules: display names, which addresses are
//! plausible, and which peers a module requires to operate. The table is
//! constructed once at startup and shared read-only across concurrent
//! pipelines - it is never mutated after construction and never inferred
//! from observed log data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved information about a known module address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Human-readable name ("Powertrain Control Module")
    pub display_name: String,
    /// True for gateway-class modules whose absence is a high-severity finding
    #[serde(default)]
    pub is_critical_dependency: bool,
}

/// Read-only reference lookup used by the classifier and the graph builder.
///
/// A lookup miss is not an error: unknown addresses are displayed with a
/// generic label and produce no missing-dependency findings (absence of
/// knowledge is not absence of dependency).
pub trait ModuleReference {
    /// Resolve a module address to its reference entry, if known
    fn resolve(&self, address: u16) -> Option<&ModuleInfo>;

    /// Required peer addresses for a module, empty when unknown
    fn required_peers(&self, address: u16) -> &[u16];

    /// Validity predicate for candidate address tokens scanned out of free
    /// text. Rejects tokens that collide with plausible non-address data
    /// such as 4-digit years.
    fn is_plausible_address(&self, token: &str, value: u16) -> bool;
}

/// Immutable reference table backed by static data.
///
/// Ships with a small built-in table of common diagnostic addresses; the
/// application layer replaces or extends it from configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticReference {
    modules: BTreeMap<u16, ModuleInfo>,
    dependencies: BTreeMap<u16, Vec<u16>>,
}

impl StaticReference {
    /// Create an empty reference table
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table covering the module addresses most session logs
    /// reference, with the gateway marked as a critical dependency.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.add_module(0x716, "Gateway Module A", true);
        table.add_module(0x732, "Gateway Module B", true);
        table.add_module(0x7E0, "Powertrain Control Module", false);
        table.add_module(0x7E1, "Transmission Control Module", false);
        table.add_module(0x726, "Body Control Module", false);
        table.add_module(0x720, "Instrument Panel Cluster", false);
        table.add_module(0x724, "Steering Column Control Module", false);
        table.add_module(0x737, "Audio Control Module", false);
        table.add_module(0x760, "Power Steering Control Module", false);
        table.add_module(0x7D0, "Accessory Protocol Interface Module", false);
        table
    }

    /// Add a module entry (construction phase only)
    pub fn add_module(&mut self, address: u16, display_name: impl Into<String>, critical: bool) {
        self.modules.insert(
            address,
            ModuleInfo {
                display_name: display_name.into(),
                is_critical_dependency: critical,
            },
        );
    }

    /// Declare the peers a module requires (construction phase only)
    pub fn add_dependency(&mut self, address: u16, required: Vec<u16>) {
        self.dependencies.insert(address, required);
    }

    /// Number of known module entries
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl ModuleReference for StaticReference {
    fn resolve(&self, address: u16) -> Option<&ModuleInfo> {
        self.modules.get(&address)
    }

    fn required_peers(&self, address: u16) -> &[u16] {
        self.dependencies
            .get(&address)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn is_plausible_address(&self, token: &str, value: u16) -> bool {
        if self.modules.contains_key(&value) {
            return true;
        }
        // 3-digit tokens are the common short diagnostic address form, but
        // must carry a decimal digit so hex-letter words ("add", "fee") do
        // not qualify. 4-digit tokens are only accepted when present in the
        // table: the unrestricted form collides with years ("2024") and
        // DIDs ("F188").
        token.len() == 3 && value != 0 && token.chars().any(|c| c.is_ascii_digit())
    }
}

/// Display name for an address, falling back to a generic label on a miss
pub fn display_name(reference: &dyn ModuleReference, address: u16) -> String {
    match reference.resolve(address) {
        Some(info) => info.display_name.clone(),
        None => format!("Unknown module {:X}", address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_lookup() {
        let reference = StaticReference::builtin();
        let info = reference.resolve(0x7E0).unwrap();
        assert_eq!(info.display_name, "Powertrain Control Module");
        assert!(!info.is_critical_dependency);
        assert!(reference.resolve(0x716).unwrap().is_critical_dependency);
        assert!(reference.resolve(0x123).is_none());
    }

    #[test]
    fn test_required_peers_empty_for_unknown() {
        let mut reference = StaticReference::new();
        reference.add_dependency(0x7E0, vec![0x716, 0x732]);

        assert_eq!(reference.required_peers(0x7E0), &[0x716, 0x732]);
        assert!(reference.required_peers(0x726).is_empty());
    }

    #[test]
    fn test_plausibility_rejects_year_like_tokens() {
        let reference = StaticReference::builtin();

        assert!(reference.is_plausible_address("7E0", 0x7E0));
        assert!(reference.is_plausible_address("726", 0x726));
        // 4-digit tokens collide with years and DIDs
        assert!(!reference.is_plausible_address("2024", 0x2024));
        assert!(!reference.is_plausible_address("F188", 0xF188));
        assert!(!reference.is_plausible_address("000", 0x000));
        // Hex-letter words are not addresses
        assert!(!reference.is_plausible_address("add", 0xADD));
        assert!(!reference.is_plausible_address("fee", 0xFEE));
        // Unknown but digit-bearing short tokens stay plausible
        assert!(reference.is_plausible_address("5A1", 0x5A1));
    }

    #[test]
    fn test_display_name_fallback() {
        let reference = StaticReference::builtin();
        assert_eq!(
            display_name(&reference, 0x7E0),
            "Powertrain Control Module"
        );
        assert_eq!(display_name(&reference, 0x5A1), "Unknown module 5A1");
    }
}
