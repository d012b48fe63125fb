//! Parsing of `[user:pass@]host[=endpoint]` mirror spec strings.

use ksail_core::model::MirrorSpec;

/// The upstream Docker Engine registry has a distinct canonical hostname;
/// every other host defaults to `https://<host>`.
#[must_use]
pub fn default_remote_for(host: &str) -> String {
    if host == "docker.io" {
        "https://registry-1.docker.io".to_string()
    } else {
        format!("https://{host}")
    }
}

/// Parse one mirror spec string of the form `[user:pass@]host[=endpoint]`.
///
/// Returns `None` when the entry is malformed or its `host`/`remote` is
/// empty after trimming — all parse errors are non-fatal, the caller
/// simply drops the entry.
#[must_use]
pub fn parse_one(raw: &str) -> Option<MirrorSpec> {
    let eq_idx = raw.find('=');
    let pre_eq = eq_idx.map_or(raw, |idx| &raw[..idx]);

    let (creds, rest) = match pre_eq.find('@') {
        Some(at_idx) if at_idx > 0 => (Some(&raw[..at_idx]), &raw[at_idx + 1..]),
        _ => (None, raw),
    };

    let (username, password) = match creds {
        Some(c) => match c.find(':') {
            Some(colon_idx) => (
                Some(c[..colon_idx].trim().to_string()),
                Some(c[colon_idx + 1..].trim().to_string()),
            ),
            None => (Some(c.trim().to_string()), None),
        },
        None => (None, None),
    };

    let (host, remote) = match rest.find('=') {
        Some(idx) => (rest[..idx].trim().to_string(), rest[idx + 1..].trim().to_string()),
        None => {
            let host = rest.trim().to_string();
            let remote = default_remote_for(&host);
            (host, remote)
        }
    };

    if host.is_empty() || remote.is_empty() {
        return None;
    }

    Some(MirrorSpec {
        host,
        remote,
        username: username.filter(|s| !s.is_empty()),
        password: password.filter(|s| !s.is_empty()),
    })
}

/// Parse a list of mirror spec strings, silently dropping malformed
/// entries (logging is the caller's responsibility).
#[must_use]
pub fn parse_mirror_specs(raw: &[impl AsRef<str>]) -> Vec<MirrorSpec> {
    raw.iter().filter_map(|s| parse_one(s.as_ref())).collect()
}
