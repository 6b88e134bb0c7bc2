use super::SnapshotProvider;
use crate::{Result, ScorerError};
use async_trait::async_trait;
use headroom_core::{Node, NodeSnapshot, Pod, WorkloadSnapshot};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// `NodeList` / `PodList` envelope; only the items matter here
#[derive(Debug, Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Snapshot provider that lists nodes and pods from a Kubernetes-compatible
/// API server
pub struct ApiSnapshot {
    base_url: String,
    bearer_token: Option<String>,
    client: Client,
}

impl ApiSnapshot {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
            client: Client::new(),
        }
    }

    /// Authenticate every request with a bearer token
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            ScorerError::snapshot_unavailable(
                self.name(),
                format!("GET {} failed", url),
                Some(Box::new(e)),
            )
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ScorerError::snapshot_unavailable(
                self.name(),
                format!("GET {} returned {}: {}", url, status, body),
                None,
            ));
        }

        let list = resp.json::<ObjectList<T>>().await.map_err(|e| {
            ScorerError::snapshot_unavailable(
                self.name(),
                format!("Failed to decode response from {}", url),
                Some(Box::new(e)),
            )
        })?;

        Ok(list.items)
    }
}

#[async_trait]
impl SnapshotProvider for ApiSnapshot {
    fn name(&self) -> &str {
        "api"
    }

    /// GET /api/v1/nodes
    async fn list_nodes(&self) -> Result<Vec<NodeSnapshot>> {
        let nodes: Vec<Node> = self.list("/api/v1/nodes").await?;
        Ok(nodes.iter().map(NodeSnapshot::from_node).collect())
    }

    /// GET /api/v1/pods
    async fn list_workloads(&self) -> Result<Vec<WorkloadSnapshot>> {
        let pods: Vec<Pod> = self.list("/api/v1/pods").await?;
        Ok(pods.iter().map(WorkloadSnapshot::from_pod).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use headroom_core::ResourceDimension;
    use serde_json::{json, Value};

    async fn node_list() -> Json<Value> {
        Json(json!({
            "kind": "NodeList",
            "apiVersion": "v1",
            "items": [{
                "metadata": {"name": "worker-1"},
                "status": {"allocatable": {"cpu": "4", "memory": "16Gi"}}
            }]
        }))
    }

    async fn pod_list(headers: HeaderMap) -> Json<Value> {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer secret");

        let name = if authorized { "authorized" } else { "anonymous" };
        Json(json!({
            "kind": "PodList",
            "apiVersion": "v1",
            "items": [{
                "metadata": {"name": name, "namespace": "default"},
                "spec": {"containers": [{"name": "app"}]}
            }]
        }))
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/api/v1/nodes", get(node_list))
            .route("/api/v1/pods", get(pod_list));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_lists_nodes_and_pods() {
        let base_url = serve().await;
        let provider = ApiSnapshot::new(&base_url);

        let nodes = provider.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "worker-1");
        assert_eq!(nodes[0].allocatable(&ResourceDimension::Cpu), Some(4000));

        let workloads = provider.list_workloads().await.unwrap();
        assert_eq!(workloads.len(), 1);
        assert_eq!(workloads[0].name, "anonymous");
        assert_eq!(workloads[0].containers[0].request(&ResourceDimension::Cpu), None);
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let base_url = serve().await;
        let provider = ApiSnapshot::new(&base_url).with_bearer_token("secret");

        let workloads = provider.list_workloads().await.unwrap();
        assert_eq!(workloads[0].name, "authorized");
    }

    #[tokio::test]
    async fn test_error_status_is_snapshot_unavailable() {
        let base_url = serve().await;
        let provider = ApiSnapshot::new(&format!("{}missing", base_url));

        let result = provider.list_nodes().await;
        assert!(matches!(result, Err(ScorerError::SnapshotUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_snapshot_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = ApiSnapshot::new(&format!("http://{}", addr));
        let result = provider.list_workloads().await;
        assert!(matches!(result, Err(ScorerError::SnapshotUnavailable { .. })));
    }
}
