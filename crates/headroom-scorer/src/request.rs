use crate::config::ScoringConfig;
use headroom_core::resources::{DEFAULT_CPU_REQUEST_MILLIS, DEFAULT_MEMORY_REQUEST_BYTES};
use headroom_core::{ContainerSpec, ResourceDimension, WorkloadSnapshot};
use tracing::debug;

/// Request a container is charged for in `dimension`.
///
/// Unset CPU and memory requests fall back to 100m / 200Mi when non-zero
/// defaults are on. An explicit zero is never replaced.
pub fn effective_request(
    container: &ContainerSpec,
    dimension: &ResourceDimension,
    config: &ScoringConfig,
) -> i64 {
    let explicit = container.request(dimension);

    let quantity = match dimension {
        ResourceDimension::Cpu => match explicit {
            None if config.use_non_zero_defaults => DEFAULT_CPU_REQUEST_MILLIS,
            other => other.unwrap_or(0),
        },
        ResourceDimension::Memory => match explicit {
            None if config.use_non_zero_defaults => DEFAULT_MEMORY_REQUEST_BYTES,
            other => other.unwrap_or(0),
        },
        ResourceDimension::EphemeralStorage if !config.enable_ephemeral_storage_isolation => 0,
        _ => explicit.unwrap_or(0),
    };

    config.accounting_quantity(dimension, quantity)
}

/// Peak request of one workload in `dimension`.
///
/// Regular containers run side by side and add up; init containers run one at
/// a time before them, so only the largest one counts. Overhead is added on
/// top when enabled.
pub fn workload_request(
    workload: &WorkloadSnapshot,
    dimension: &ResourceDimension,
    config: &ScoringConfig,
) -> i64 {
    let container_sum = workload
        .containers
        .iter()
        .map(|c| effective_request(c, dimension, config))
        .fold(0i64, i64::saturating_add);

    let max_init = workload
        .init_containers
        .iter()
        .map(|c| effective_request(c, dimension, config))
        .fold(0i64, i64::max);

    let mut request = container_sum.max(max_init);

    if config.enable_overhead {
        if let Some(overhead) = workload.overhead(dimension) {
            request = request.saturating_add(config.accounting_quantity(dimension, overhead));
        }
    }

    request
}

/// Sum the peak requests of every workload in `dimension`
pub fn sum_requests(
    workloads: &[WorkloadSnapshot],
    dimension: &ResourceDimension,
    config: &ScoringConfig,
) -> i64 {
    let total = workloads
        .iter()
        .map(|w| workload_request(w, dimension, config))
        .fold(0i64, i64::saturating_add);

    debug!(
        "Requested {}: {} across {} workloads",
        dimension,
        total,
        workloads.len()
    );

    total
}
