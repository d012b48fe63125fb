//! Rendering of the containerd v2 "hosts directory" `hosts.toml` format.

/// Escape a string for safe embedding inside a TOML basic string.
fn escape_toml(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render one `hosts.toml` document.
///
/// For scaffolded files `endpoint` should be `http://<host>:5000` (the
/// cluster-side hostname); for runtime injection it should be the
/// prefixed container name's endpoint.
#[must_use]
pub fn render_hosts_toml(remote: &str, endpoint: &str) -> String {
    format!(
        "server = \"{}\"\n\n[host.\"{}\"]\n  capabilities = [\"pull\", \"resolve\"]\n",
        escape_toml(remote),
        escape_toml(endpoint),
    )
}
