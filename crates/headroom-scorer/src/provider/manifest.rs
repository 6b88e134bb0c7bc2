use super::SnapshotProvider;
use crate::{Result, ScorerError};
use async_trait::async_trait;
use headroom_core::{Node, NodeSnapshot, Pod, WorkloadSnapshot};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// On-disk cluster dump: `nodes:` and `pods:` lists of Kubernetes objects
#[derive(Debug, Default, Deserialize)]
struct ClusterManifest {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    pods: Vec<Pod>,
}

/// Snapshot provider backed by a JSON or YAML manifest file.
///
/// The file is re-read on every listing so a long-running scorer picks up
/// edits without a restart.
pub struct ManifestSnapshot {
    path: PathBuf,
}

impl ManifestSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<ClusterManifest> {
        debug!("Reading cluster manifest {}", self.path.display());

        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ScorerError::snapshot_unavailable(
                self.name(),
                format!("Failed to read {}", self.path.display()),
                Some(Box::new(e)),
            )
        })?;

        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            headroom_core::from_json(&data)
        } else {
            headroom_core::from_yaml(&data)
        };

        parsed.map_err(|e| {
            ScorerError::snapshot_unavailable(
                self.name(),
                format!("Failed to parse {}", self.path.display()),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait]
impl SnapshotProvider for ManifestSnapshot {
    fn name(&self) -> &str {
        "manifest"
    }

    async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>> {
        let manifest = self.load().await?;
        Ok(manifest.nodes.iter().map(NodeSnapshot::from_node).collect())
    }

    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>> {
        let manifest = self.load().await?;
        Ok(manifest.pods.iter().map(WorkloadSnapshot::from_pod).collect())
    }
}
