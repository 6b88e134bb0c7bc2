pub mod quantities;

pub use quantities::{
    millis_to_whole_ceil, parse_quantity, BYTES_PER_MIB, DEFAULT_CPU_REQUEST_MILLIS,
    DEFAULT_MEMORY_REQUEST_BYTES, MILLIS_PER_CORE,
};

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A resource dimension that can be aggregated and scored.
///
/// The dimension fixes the base unit of its quantities: CPU is counted in
/// milli-units, memory and ephemeral storage in bytes, extended resources in
/// whole units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceDimension {
    Cpu,
    Memory,
    EphemeralStorage,
    /// Any other resource name, e.g. `nvidia.com/gpu` or `pods`
    Extended(String),
}

impl ResourceDimension {
    /// Map a Kubernetes resource name to a dimension
    pub fn from_name(name: &str) -> Self {
        match name {
            "cpu" => Self::Cpu,
            "memory" => Self::Memory,
            "ephemeral-storage" => Self::EphemeralStorage,
            other => Self::Extended(other.to_string()),
        }
    }

    /// Kubernetes resource name for this dimension
    pub fn name(&self) -> &str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::EphemeralStorage => "ephemeral-storage",
            Self::Extended(name) => name.as_str(),
        }
    }

    /// Whether quantities of this dimension are stored in milli-units
    pub fn is_milli_scaled(&self) -> bool {
        matches!(self, Self::Cpu)
    }
}

impl fmt::Display for ResourceDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceDimension {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl From<String> for ResourceDimension {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ResourceDimension> for String {
    fn from(dimension: ResourceDimension) -> Self {
        dimension.name().to_string()
    }
}

/// Quantities keyed by dimension, in each dimension's base unit.
///
/// A missing key means "not declared", which is not the same as an explicit 0.
pub type ResourceList = BTreeMap<ResourceDimension, i64>;

/// Convert a k8s-openapi resource map into a [`ResourceList`].
///
/// Entries whose quantity cannot be parsed are dropped with a warning, so they
/// read as absent rather than as zero.
pub fn parse_resource_list(resources: &BTreeMap<String, Quantity>, owner: &str) -> ResourceList {
    let mut list = ResourceList::new();

    for (name, quantity) in resources {
        let dimension = ResourceDimension::from_name(name);
        match parse_quantity(&quantity.0, &dimension) {
            Ok(value) => {
                list.insert(dimension, value);
            }
            Err(e) => {
                warn!("Ignoring {} quantity on {}: {}", name, owner, e);
            }
        }
    }

    list
}
