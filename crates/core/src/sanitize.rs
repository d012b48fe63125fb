//! DNS-label sanitisation shared by the mirror engine (container naming)
//! and the containerd injector (certs.d directory naming).

/// Collapse every run of characters outside `[a-z0-9]` to a single `-`,
/// trim leading/trailing `-`, and truncate to 63 octets (the DNS label
/// limit). Idempotent: `sanitize_host(sanitize_host(h)) == sanitize_host(h)`.
#[must_use]
pub fn sanitize_host(host: &str) -> String {
    let lower = host.to_lowercase();
    let mut collapsed = String::with_capacity(lower.len());
    let mut last_was_dash = false;
    for ch in lower.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            collapsed.push(ch);
            last_was_dash = false;
        } else if !last_was_dash {
            collapsed.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = collapsed.trim_matches('-');
    let truncated: String = trimmed.chars().take(63).collect();
    truncated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_non_alphanumeric_runs() {
        assert_eq!(sanitize_host("docker.io"), "docker-io");
        assert_eq!(sanitize_host("registry.example.com:443"), "registry-example-com-443");
    }

    #[test]
    fn trims_leading_and_trailing_dashes() {
        assert_eq!(sanitize_host(".docker.io."), "docker-io");
    }

    #[test]
    fn is_idempotent() {
        for host in ["docker.io", "GHCR.IO", "a..b..c", "---weird---"] {
            let once = sanitize_host(host);
            let twice = sanitize_host(&once);
            assert_eq!(once, twice, "sanitize_host must be idempotent for {host}");
        }
    }

    #[test]
    fn truncates_to_63_octets() {
        let long_host = "a".repeat(100);
        let sanitized = sanitize_host(&long_host);
        assert!(sanitized.len() <= 63);
    }

    #[test]
    fn matches_dns_label_shape_or_is_empty() {
        let re_chars = |s: &str| {
            s.is_empty()
                || (s
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                    && !s.starts_with('-')
                    && !s.ends_with('-'))
        };
        for host in ["docker.io", "ghcr.io", "---", "", "registry.example.com:443"] {
            assert!(re_chars(&sanitize_host(host)), "failed for {host}");
        }
    }
}
