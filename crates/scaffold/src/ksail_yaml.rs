//! Rendering of the root `ksail.yaml` cluster intent file.
//!
//! Distribution-dependent defaults (context name, distribution config
//! filename) are filled in via [`ClusterSpec::resolved_context`] and
//! [`ClusterSpec::resolved_distribution_config`] before serialisation, so
//! the file on disk never carries an empty `context:` or
//! `distributionConfig:` field.

use ksail_core::model::ClusterSpec;

/// Render `ksail.yaml` for `spec`, with blank distribution-dependent
/// fields filled in.
///
/// # Errors
///
/// Returns an error only if YAML serialisation fails, which does not
/// happen for this struct shape in practice.
pub fn render_ksail_yaml(spec: &ClusterSpec) -> Result<String, serde_yaml::Error> {
    let mut resolved = spec.clone();
    resolved.context = resolved.resolved_context();
    resolved.distribution_config = resolved.resolved_distribution_config();
    serde_yaml::to_string(&resolved)
}
