use crate::allocatable::sum_allocatable;
use crate::config::ScoringConfig;
use crate::normalize::ScoreScale;
use crate::provider::SnapshotProvider;
use crate::request::sum_requests;
use crate::Result;
use headroom_core::{NodeSnapshot, ResourceDimension, WorkloadSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Dimensions scored when the caller does not ask for specific ones
pub fn default_dimensions() -> Vec<ResourceDimension> {
    vec![ResourceDimension::Cpu, ResourceDimension::Memory]
}

/// Aggregates and score for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Allocatable capacity of schedulable nodes (accounting units)
    pub allocatable: i64,
    /// Peak requests of all workloads (accounting units)
    pub requested: i64,
    /// `allocatable - requested`; negative when over-committed
    pub available: i64,
    /// Raw score, at most 100 and negative when over-committed
    pub score: i64,
}

impl DimensionScore {
    /// Score floored at 0 for callers that treat over-commitment as "no room"
    pub fn clamped(&self) -> i64 {
        self.score.max(0)
    }
}

/// Named score as published for cluster placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementScore {
    pub name: String,
    pub value: i64,
}

/// Scores for one cluster snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub nodes: usize,
    pub workloads: usize,
    pub scores: BTreeMap<ResourceDimension, DimensionScore>,
}

impl ScoreReport {
    /// Raw score for a dimension, if it was computed
    pub fn score(&self, dimension: &ResourceDimension) -> Option<i64> {
        self.scores.get(dimension).map(|s| s.score)
    }

    /// Scores named the way placement consumers expect
    /// (`cpuAvailable`, `memAvailable`, ...)
    pub fn placement_scores(&self) -> Vec<PlacementScore> {
        self.scores
            .iter()
            .map(|(dimension, score)| PlacementScore {
                name: placement_score_name(dimension),
                value: score.score,
            })
            .collect()
    }
}

fn placement_score_name(dimension: &ResourceDimension) -> String {
    match dimension {
        ResourceDimension::Cpu => "cpuAvailable".to_string(),
        ResourceDimension::Memory => "memAvailable".to_string(),
        ResourceDimension::EphemeralStorage => "ephemeralStorageAvailable".to_string(),
        ResourceDimension::Extended(name) => format!("{}Available", name),
    }
}

/// Score one snapshot. Pure and total: no input makes it fail.
pub fn score_snapshot(
    nodes: &[NodeSnapshot],
    workloads: &[WorkloadSnapshot],
    dimensions: &[ResourceDimension],
    config: &ScoringConfig,
) -> ScoreReport {
    let mut scores = BTreeMap::new();

    for dimension in dimensions {
        let allocatable = sum_allocatable(nodes, dimension, config);
        let requested = sum_requests(workloads, dimension, config);
        let available = allocatable.saturating_sub(requested);
        let score = ScoreScale::for_dimension(dimension, config).normalize(available);

        debug!(
            "Dimension {} score: {} (allocatable {}, requested {}, available {})",
            dimension, score, allocatable, requested, available
        );

        scores.insert(
            dimension.clone(),
            DimensionScore {
                allocatable,
                requested,
                available,
                score,
            },
        );
    }

    ScoreReport {
        nodes: nodes.len(),
        workloads: workloads.len(),
        scores,
    }
}

/// Computes availability scores for the cluster behind a snapshot provider
pub struct ClusterScorer {
    provider: Arc<dyn SnapshotProvider>,
    config: ScoringConfig,
}

impl ClusterScorer {
    /// Create a new scorer
    pub fn new(provider: Arc<dyn SnapshotProvider>, config: ScoringConfig) -> Self {
        Self { provider, config }
    }

    /// List the cluster and score each requested dimension.
    ///
    /// Fails only when the provider cannot list nodes or workloads; that error
    /// is returned unchanged.
    pub async fn compute_scores(&self, dimensions: &[ResourceDimension]) -> Result<ScoreReport> {
        debug!("Listing snapshot from {} provider", self.provider.name());

        let (nodes, workloads) =
            tokio::join!(self.provider.list_nodes(), self.provider.list_workloads());
        let nodes = nodes?;
        let workloads = workloads?;

        let report = score_snapshot(&nodes, &workloads, dimensions, &self.config);

        info!(
            "Scored {} nodes and {} workloads: {}",
            report.nodes,
            report.workloads,
            report
                .scores
                .iter()
                .map(|(d, s)| format!("{}={}", d, s.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(report)
    }
}
