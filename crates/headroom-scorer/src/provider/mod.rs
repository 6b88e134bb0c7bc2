//! Sources of node and workload snapshots
//!
//! A provider only lists; it never filters or scores. Any failure to list is
//! reported as [`ScorerError::SnapshotUnavailable`](crate::ScorerError).

pub mod api;
pub mod manifest;

pub use api::ApiSnapshot;
pub use manifest::ManifestSnapshot;

use crate::Result;
use async_trait::async_trait;
use headroom_core::{NodeSnapshot, WorkloadSnapshot};

/// Trait for snapshot sources
///
/// Node and workload listings are independent point-in-time views; a small
/// skew between the two is tolerated.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// List every node, cordoned ones included
    async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>>;

    /// List every workload
    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>>;
}

/// In-memory snapshot, used for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshot {
    nodes: Vec<NodeSnapshot>,
    workloads: Vec<WorkloadSnapshot>,
}

impl StaticSnapshot {
    pub fn new(nodes: Vec<NodeSnapshot>, workloads: Vec<WorkloadSnapshot>) -> Self {
        Self { nodes, workloads }
    }
}

#[async_trait]
impl SnapshotProvider for StaticSnapshot {
    fn name(&self) -> &str {
        "static"
    }

    async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>> {
        Ok(self.nodes.clone())
    }

    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>> {
        Ok(self.workloads.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_snapshot_lists_what_it_holds() {
        let provider = StaticSnapshot::new(
            vec![NodeSnapshot::new("node1"), NodeSnapshot::new("node2").unschedulable()],
            vec![WorkloadSnapshot::new("default", "web")],
        );

        let nodes = provider.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(!nodes[1].schedulable);

        let workloads = provider.list_workloads().await.unwrap();
        assert_eq!(workloads[0].name, "web");
    }
}
