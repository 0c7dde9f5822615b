use serde::{Deserialize, Serialize};

use crate::registry::Registry;

/// Aggregate counts over a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMetrics {
    /// Distinct canonical abbreviations.
    pub abbreviation_count: usize,
    /// Sum of all meaning list lengths.
    pub meaning_count: usize,
}

pub fn compute_metrics(registry: &Registry) -> RegistryMetrics {
    RegistryMetrics {
        abbreviation_count: registry.len(),
        meaning_count: registry.values().map(Vec::len).sum(),
    }
}
