use thiserror::Error;

/// Sentinel errors exposed at the core boundary.
///
/// Every distribution adapter, the registry backend, and the injector wrap
/// their own failures into one of these variants so callers can match on a
/// stable identity rather than a formatted string.
#[derive(Debug, Error)]
pub enum KsailError {
    #[error("unknown distribution: {0}")]
    UnknownDistribution(String),

    #[error("vanilla cluster config generation failed: {0}")]
    KindConfigGeneration(String),

    #[error("k3d cluster config generation failed: {0}")]
    K3dConfigGeneration(String),

    #[error("talos cluster config generation failed: {0}")]
    TalosConfigGeneration(String),

    #[error("vcluster config generation failed: {0}")]
    VClusterConfigGeneration(String),

    #[error("kustomization generation failed: {0}")]
    KustomizationGeneration(String),

    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("no infrastructure provider configured for this adapter")]
    ProviderNotSet,

    #[error("no node containers matched cluster {0}")]
    NoNodes(String),

    #[error("exec failed with exit code {code}: {stderr}")]
    ExecFailed { code: i64, stderr: String },

    #[error("base directory must not be empty")]
    EmptyBaseDir,

    #[error("tool {tool} is missing required subcommand parameter {param}")]
    MissingSubcommandParam { tool: String, param: String },

    #[error("tool {tool} received invalid subcommand {value}")]
    InvalidSubcommand { tool: String, value: String },

    #[error("tool {tool} argument {arg} must be an array")]
    ArgsNotArray { tool: String, arg: String },

    #[error("tool {tool} received unknown parameter {param}")]
    UnknownParameter { tool: String, param: String },

    #[error("failed to fetch manifest from {url}: {source}")]
    ManifestFetchFailed {
        url: String,
        #[source]
        source: reqwest_error_shim::Error,
    },

    #[error("operation cancelled during {phase}")]
    Cancelled { phase: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// `ManifestFetchFailed` carries a `reqwest::Error` in the full crate, but
/// `ksail-core` intentionally has no HTTP dependency — callers that hit this
/// variant construct it from their own `reqwest` error via `Into`. This shim
/// module exists only to give the variant a concrete, object-safe source
/// type without pulling `reqwest` into this crate's dependency graph.
pub mod reqwest_error_shim {
    use std::fmt;

    #[derive(Debug)]
    pub struct Error(pub String);

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for Error {}
}

pub type Result<T> = std::result::Result<T, KsailError>;
