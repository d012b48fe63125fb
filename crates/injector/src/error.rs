//! Errors surfaced by the containerd injector.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("no node containers matched cluster {0}")]
    NoNodes(String),

    #[error("exec failed with exit code {code}: {stderr}")]
    ExecFailed { code: i64, stderr: String },
}

impl InjectorError {
    /// Translate into the shared sentinel error type other crates key on.
    #[must_use]
    pub fn into_sentinel(self) -> ksail_core::KsailError {
        match self {
            Self::NoNodes(cluster) => ksail_core::KsailError::NoNodes(cluster),
            Self::ExecFailed { code, stderr } => ksail_core::KsailError::ExecFailed { code, stderr },
            Self::Docker(err) => ksail_core::KsailError::Other(err.to_string()),
        }
    }
}
