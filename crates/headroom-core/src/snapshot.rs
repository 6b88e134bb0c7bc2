use crate::resources::{parse_resource_list, ResourceDimension, ResourceList};
use k8s_openapi::api::core::v1::{Container, Node, Pod};

/// One cluster node as seen at scoring time
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    /// Node name
    pub name: String,
    /// Unschedulable nodes are left out of every aggregate
    pub schedulable: bool,
    /// Capacity left for workloads after system reservations
    pub allocatable: ResourceList,
}

impl NodeSnapshot {
    /// Create a schedulable node with no allocatable resources
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schedulable: true,
            allocatable: ResourceList::new(),
        }
    }

    /// Set an allocatable quantity (base units)
    pub fn with_allocatable(mut self, dimension: ResourceDimension, quantity: i64) -> Self {
        self.allocatable.insert(dimension, quantity);
        self
    }

    /// Mark the node as cordoned
    pub fn unschedulable(mut self) -> Self {
        self.schedulable = false;
        self
    }

    /// Allocatable quantity for a dimension, if the node reports one
    pub fn allocatable(&self, dimension: &ResourceDimension) -> Option<i64> {
        self.allocatable.get(dimension).copied()
    }

    /// Build a snapshot from a Kubernetes Node
    pub fn from_node(node: &Node) -> Self {
        let name = node.metadata.name.clone().unwrap_or_default();

        let schedulable = !node
            .spec
            .as_ref()
            .and_then(|s| s.unschedulable)
            .unwrap_or(false);

        let allocatable = node
            .status
            .as_ref()
            .and_then(|s| s.allocatable.as_ref())
            .map(|a| parse_resource_list(a, &format!("node {}", name)))
            .unwrap_or_default();

        Self {
            name,
            schedulable,
            allocatable,
        }
    }
}

/// Resource requests of a single container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub requests: ResourceList,
}

impl ContainerSpec {
    /// Create a container with no requests
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requests: ResourceList::new(),
        }
    }

    /// Set an explicit request (base units)
    pub fn with_request(mut self, dimension: ResourceDimension, quantity: i64) -> Self {
        self.requests.insert(dimension, quantity);
        self
    }

    /// Explicit request for a dimension; `None` when the container declares none
    pub fn request(&self, dimension: &ResourceDimension) -> Option<i64> {
        self.requests.get(dimension).copied()
    }

    fn from_container(container: &Container, owner: &str) -> Self {
        let requests = container
            .resources
            .as_ref()
            .and_then(|r| r.requests.as_ref())
            .map(|r| parse_resource_list(r, &format!("{} container {}", owner, container.name)))
            .unwrap_or_default();

        Self {
            name: container.name.clone(),
            requests,
        }
    }
}

/// One workload (pod) as seen at scoring time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkloadSnapshot {
    pub name: String,
    pub namespace: String,
    /// Regular containers; they run together, so their requests add up
    pub containers: Vec<ContainerSpec>,
    /// Init containers; they run one at a time before the regular containers
    pub init_containers: Vec<ContainerSpec>,
    /// Fixed per-workload cost such as the sandbox runtime
    pub overhead: Option<ResourceList>,
}

impl WorkloadSnapshot {
    /// Create an empty workload
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_container(mut self, container: ContainerSpec) -> Self {
        self.containers.push(container);
        self
    }

    pub fn with_init_container(mut self, container: ContainerSpec) -> Self {
        self.init_containers.push(container);
        self
    }

    pub fn with_overhead(mut self, dimension: ResourceDimension, quantity: i64) -> Self {
        self.overhead
            .get_or_insert_with(ResourceList::new)
            .insert(dimension, quantity);
        self
    }

    /// Declared overhead for a dimension, if any
    pub fn overhead(&self, dimension: &ResourceDimension) -> Option<i64> {
        self.overhead.as_ref().and_then(|o| o.get(dimension).copied())
    }

    /// Build a snapshot from a Kubernetes Pod.
    ///
    /// A pod without a spec becomes an empty workload.
    pub fn from_pod(pod: &Pod) -> Self {
        let name = pod.metadata.name.clone().unwrap_or_default();
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let owner = format!("pod {}/{}", namespace, name);

        let Some(spec) = &pod.spec else {
            return Self::new(namespace, name);
        };

        let containers = spec
            .containers
            .iter()
            .map(|c| ContainerSpec::from_container(c, &owner))
            .collect();

        let init_containers = spec
            .init_containers
            .iter()
            .flatten()
            .map(|c| ContainerSpec::from_container(c, &owner))
            .collect();

        let overhead = spec
            .overhead
            .as_ref()
            .map(|o| parse_resource_list(o, &owner));

        Self {
            name,
            namespace,
            containers,
            init_containers,
            overhead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{NodeSpec, NodeStatus, PodSpec, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use std::collections::BTreeMap;

    fn quantities(pairs: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect()
    }

    fn create_test_container(name: &str, requests: &[(&str, &str)]) -> Container {
        Container {
            name: name.to_string(),
            resources: Some(ResourceRequirements {
                requests: Some(quantities(requests)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_node_from_k8s() {
        let mut node = Node::default();
        node.metadata.name = Some("worker-1".to_string());
        node.status = Some(NodeStatus {
            allocatable: Some(quantities(&[("cpu", "3800m"), ("memory", "15Gi")])),
            ..Default::default()
        });

        let snapshot = NodeSnapshot::from_node(&node);
        assert_eq!(snapshot.name, "worker-1");
        assert!(snapshot.schedulable);
        assert_eq!(snapshot.allocatable(&ResourceDimension::Cpu), Some(3800));
        assert_eq!(
            snapshot.allocatable(&ResourceDimension::Memory),
            Some(15 * 1024 * 1024 * 1024)
        );
    }

    #[test]
    fn test_cordoned_node_is_unschedulable() {
        let mut node = Node::default();
        node.metadata.name = Some("worker-2".to_string());
        node.spec = Some(NodeSpec {
            unschedulable: Some(true),
            ..Default::default()
        });

        let snapshot = NodeSnapshot::from_node(&node);
        assert!(!snapshot.schedulable);
        assert!(snapshot.allocatable.is_empty());
    }

    #[test]
    fn test_pod_from_k8s_keeps_absent_and_zero_apart() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("web".to_string());
        pod.metadata.namespace = Some("default".to_string());
        pod.spec = Some(PodSpec {
            containers: vec![
                create_test_container("app", &[("cpu", "0"), ("memory", "64Mi")]),
                Container {
                    name: "sidecar".to_string(),
                    ..Default::default()
                },
            ],
            init_containers: Some(vec![create_test_container("migrate", &[("cpu", "500m")])]),
            overhead: Some(quantities(&[("memory", "64Mi")])),
            ..Default::default()
        });

        let workload = WorkloadSnapshot::from_pod(&pod);
        assert_eq!(workload.name, "web");
        assert_eq!(workload.namespace, "default");
        assert_eq!(workload.containers.len(), 2);
        assert_eq!(workload.containers[0].request(&ResourceDimension::Cpu), Some(0));
        assert_eq!(workload.containers[1].request(&ResourceDimension::Cpu), None);
        assert_eq!(
            workload.init_containers[0].request(&ResourceDimension::Cpu),
            Some(500)
        );
        assert_eq!(
            workload.overhead(&ResourceDimension::Memory),
            Some(64 * 1024 * 1024)
        );
    }

    #[test]
    fn test_pod_without_spec_is_empty() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("pending".to_string());

        let workload = WorkloadSnapshot::from_pod(&pod);
        assert!(workload.containers.is_empty());
        assert!(workload.init_containers.is_empty());
        assert!(workload.overhead.is_none());
    }

    #[test]
    fn test_builders() {
        let workload = WorkloadSnapshot::new("default", "job")
            .with_container(ContainerSpec::new("main").with_request(ResourceDimension::Cpu, 250))
            .with_overhead(ResourceDimension::Cpu, 10);

        assert_eq!(workload.containers[0].request(&ResourceDimension::Cpu), Some(250));
        assert_eq!(workload.overhead(&ResourceDimension::Cpu), Some(10));
        assert_eq!(workload.overhead(&ResourceDimension::Memory), None);

        let node = NodeSnapshot::new("n1").unschedulable();
        assert!(!node.schedulable);
    }
}
