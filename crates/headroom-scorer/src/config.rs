use crate::{Result, ScorerError};
use headroom_core::resources::millis_to_whole_ceil;
use headroom_core::ResourceDimension;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unit in which CPU quantities are summed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CpuGranularity {
    /// Sum milli-units; the aggregate is divided by 1000 when scored
    #[default]
    Millicores,
    /// Count CPU in whole cores, rounding each request and the allocatable total up
    Cores,
}

/// Policy knobs for one scoring pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Substitute 100m CPU / 200Mi memory for requests a container leaves unset
    pub use_non_zero_defaults: bool,
    /// Add pod overhead to each workload's request
    pub enable_overhead: bool,
    /// Count ephemeral-storage requests at all
    pub enable_ephemeral_storage_isolation: bool,
    pub cpu_granularity: CpuGranularity,
}

impl ScoringConfig {
    /// Milli-unit accounting with non-zero defaults for unset requests
    pub fn non_zero_requests() -> Self {
        Self {
            use_non_zero_defaults: true,
            enable_overhead: true,
            enable_ephemeral_storage_isolation: true,
            cpu_granularity: CpuGranularity::Millicores,
        }
    }

    /// Only what pods actually request, CPU counted in whole cores
    pub fn requested_only() -> Self {
        Self {
            use_non_zero_defaults: false,
            enable_overhead: true,
            enable_ephemeral_storage_isolation: true,
            cpu_granularity: CpuGranularity::Cores,
        }
    }

    /// Load a configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ScorerError::invalid_config(
                format!("Failed to read {}: {}", path.display(), e),
                "Check that the config file exists and is readable",
            )
        })?;

        headroom_core::from_yaml(&data).map_err(|e| {
            ScorerError::invalid_config(
                format!("Failed to parse {}: {}", path.display(), e),
                "Expected keys: use_non_zero_defaults, enable_overhead, \
                 enable_ephemeral_storage_isolation, cpu_granularity",
            )
        })
    }

    /// Express a quantity in the unit this config aggregates it in
    pub fn accounting_quantity(&self, dimension: &ResourceDimension, quantity: i64) -> i64 {
        match (dimension, self.cpu_granularity) {
            (ResourceDimension::Cpu, CpuGranularity::Cores) => millis_to_whole_ceil(quantity),
            _ => quantity,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::non_zero_requests()
    }
}
