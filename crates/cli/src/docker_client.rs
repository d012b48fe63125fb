//! A single connected [`bollard::Docker`] handle shared across the
//! registry backend, the containerd injector, and the Docker-backed
//! distribution adapters for one command invocation.
//!
//! Built once per command via an explicit factory rather than a
//! process-wide static, matching this workspace's existing preference for
//! dependency-injected infrastructure clients.

use anyhow::{Context, Result};
use bollard::Docker;

/// Connect to the local Docker daemon using the platform default
/// transport.
pub fn connect() -> Result<Docker> {
    Docker::connect_with_local_defaults().context("connecting to the local Docker daemon")
}
