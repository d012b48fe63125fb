//! Start/Stop for every Docker-backed distribution delegate to the same
//! container-level operation: find every node container by the
//! distribution's discovery scheme (reusing `ksail-injector`'s label/name
//! tables) and start or stop each one. vCluster does not route through
//! here; it has its own CLI-level pause/resume.

use bollard::container::{StartContainerOptions, StopContainerOptions};
use bollard::Docker;

use ksail_core::model::Distribution;
use ksail_core::KsailError;
use ksail_injector::discovery::discover_nodes;

/// Start every node container backing `cluster`. Returns
/// [`KsailError::ProviderNotSet`] when no Docker client is configured for
/// this adapter.
pub async fn start_nodes(
    docker: Option<&Docker>,
    distribution: Distribution,
    cluster: &str,
) -> Result<(), KsailError> {
    let docker = docker.ok_or(KsailError::ProviderNotSet)?;
    let nodes = discover_nodes(docker, distribution, cluster)
        .await
        .map_err(ksail_injector::InjectorError::into_sentinel)?;
    for node in nodes {
        docker
            .start_container(&node.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|err| KsailError::Other(format!("starting {}: {err}", node.name)))?;
    }
    Ok(())
}

/// Stop every node container backing `cluster`.
pub async fn stop_nodes(
    docker: Option<&Docker>,
    distribution: Distribution,
    cluster: &str,
) -> Result<(), KsailError> {
    let docker = docker.ok_or(KsailError::ProviderNotSet)?;
    let nodes = discover_nodes(docker, distribution, cluster)
        .await
        .map_err(ksail_injector::InjectorError::into_sentinel)?;
    for node in nodes {
        docker
            .stop_container(&node.id, None::<StopContainerOptions>)
            .await
            .map_err(|err| KsailError::Other(format!("stopping {}: {err}", node.name)))?;
    }
    Ok(())
}
