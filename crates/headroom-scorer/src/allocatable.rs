use crate::config::ScoringConfig;
use headroom_core::{NodeSnapshot, ResourceDimension};
use tracing::debug;

/// Sum allocatable capacity for `dimension` over all schedulable nodes.
///
/// Nodes that do not report the dimension contribute 0, and an empty or fully
/// cordoned cluster sums to 0. Node quantities are summed in their base unit and
/// the total is converted to the accounting unit once.
pub fn sum_allocatable(
    nodes: &[NodeSnapshot],
    dimension: &ResourceDimension,
    config: &ScoringConfig,
) -> i64 {
    let mut base_total = 0i64;
    let mut counted = 0usize;

    for node in nodes.iter().filter(|n| n.schedulable) {
        let quantity = node.allocatable(dimension).unwrap_or(0);
        base_total = base_total.saturating_add(quantity);
        counted += 1;
    }

    let total = config.accounting_quantity(dimension, base_total);

    debug!(
        "Allocatable {}: {} across {} schedulable of {} nodes",
        dimension,
        total,
        counted,
        nodes.len()
    );

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIB: i64 = 1024 * 1024 * 1024;

    #[test]
    fn test_sums_schedulable_nodes_only() {
        let nodes = vec![
            NodeSnapshot::new("node1")
                .with_allocatable(ResourceDimension::Cpu, 4000)
                .with_allocatable(ResourceDimension::Memory, 8 * GIB),
            NodeSnapshot::new("node2")
                .with_allocatable(ResourceDimension::Cpu, 2000)
                .with_allocatable(ResourceDimension::Memory, 4 * GIB),
            NodeSnapshot::new("cordoned")
                .with_allocatable(ResourceDimension::Cpu, 64000)
                .unschedulable(),
        ];
        let config = ScoringConfig::default();

        assert_eq!(sum_allocatable(&nodes, &ResourceDimension::Cpu, &config), 6000);
        assert_eq!(
            sum_allocatable(&nodes, &ResourceDimension::Memory, &config),
            12 * GIB
        );
    }

    #[test]
    fn test_missing_dimension_contributes_zero() {
        let nodes = vec![
            NodeSnapshot::new("gpu")
                .with_allocatable(ResourceDimension::from_name("nvidia.com/gpu"), 4),
            NodeSnapshot::new("plain").with_allocatable(ResourceDimension::Cpu, 1000),
        ];

        let gpus = sum_allocatable(
            &nodes,
            &ResourceDimension::from_name("nvidia.com/gpu"),
            &ScoringConfig::default(),
        );
        assert_eq!(gpus, 4);
    }

    #[test]
    fn test_no_schedulable_nodes() {
        let config = ScoringConfig::default();
        assert_eq!(sum_allocatable(&[], &ResourceDimension::Cpu, &config), 0);

        let nodes = vec![NodeSnapshot::new("n1")
            .with_allocatable(ResourceDimension::Cpu, 1000)
            .unschedulable()];
        assert_eq!(sum_allocatable(&nodes, &ResourceDimension::Cpu, &config), 0);
    }

    #[test]
    fn test_cores_granularity_rounds_cluster_total_once() {
        let nodes = vec![
            NodeSnapshot::new("n1").with_allocatable(ResourceDimension::Cpu, 3500),
            NodeSnapshot::new("n2").with_allocatable(ResourceDimension::Cpu, 3500),
        ];

        let total = sum_allocatable(
            &nodes,
            &ResourceDimension::Cpu,
            &ScoringConfig::requested_only(),
        );
        assert_eq!(total, 7);

        let nodes = vec![
            NodeSnapshot::new("n1").with_allocatable(ResourceDimension::Cpu, 3500),
            NodeSnapshot::new("n2").with_allocatable(ResourceDimension::Cpu, 3600),
        ];
        let total = sum_allocatable(
            &nodes,
            &ResourceDimension::Cpu,
            &ScoringConfig::requested_only(),
        );
        assert_eq!(total, 8);
    }
}
