//! Per-distribution node discovery: each driver has its own label or
//! name pattern for the containers that back its cluster nodes.

use bollard::container::ListContainersOptions;
use bollard::Docker;
use std::collections::HashMap;

use ksail_core::model::Distribution;

use crate::InjectorError;

/// One discovered node container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContainer {
    pub id: String,
    pub name: String,
}

/// Discover the node containers backing `cluster` for `distribution`.
///
/// Returns [`InjectorError::NoNodes`] when zero containers match — this
/// is a distinct, fatal error for the mirror injection step rather than
/// a silently-empty result.
pub async fn discover_nodes(
    docker: &Docker,
    distribution: Distribution,
    cluster: &str,
) -> Result<Vec<NodeContainer>, InjectorError> {
    let containers = match distribution {
        Distribution::Vanilla => {
            list_by_label(docker, "io.x-k8s.kind.cluster", cluster).await?
        }
        Distribution::K3s => list_by_label(docker, "k3d.cluster", cluster).await?,
        Distribution::Talos => list_by_label(docker, "ksail.io/talos-cluster", cluster).await?,
        Distribution::VCluster => list_by_name_prefix(docker, cluster).await?,
    };

    if containers.is_empty() {
        return Err(InjectorError::NoNodes(cluster.to_string()));
    }
    Ok(containers)
}

async fn list_by_label(
    docker: &Docker,
    label_key: &str,
    value: &str,
) -> Result<Vec<NodeContainer>, InjectorError> {
    let mut filters: HashMap<String, Vec<String>> = HashMap::new();
    filters.insert("label".to_string(), vec![format!("{label_key}={value}")]);
    let summaries = docker
        .list_containers(Some(ListContainersOptions {
            all: true,
            filters,
            ..Default::default()
        }))
        .await?;
    Ok(to_node_containers(summaries))
}

/// vCluster nodes are named `vcluster.cp.<cluster>` or
/// `vcluster.node.<cluster>.<idx>` rather than labelled.
async fn list_by_name_prefix(
    docker: &Docker,
    cluster: &str,
) -> Result<Vec<NodeContainer>, InjectorError> {
    let summaries = docker
        .list_containers(Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        }))
        .await?;
    let cp_name = format!("vcluster.cp.{cluster}");
    let node_prefix = format!("vcluster.node.{cluster}.");
    Ok(to_node_containers(summaries)
        .into_iter()
        .filter(|c| c.name == cp_name || c.name.starts_with(&node_prefix))
        .collect())
}

fn to_node_containers(summaries: Vec<bollard::secret::ContainerSummary>) -> Vec<NodeContainer> {
    summaries
        .into_iter()
        .filter_map(|summary| {
            let id = summary.id?;
            let name = summary.names?.into_iter().next()?;
            Some(NodeContainer {
                id,
                name: name.trim_start_matches('/').to_string(),
            })
        })
        .collect()
}
