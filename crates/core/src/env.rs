//! `${VAR}` credential placeholder resolution against the process
//! environment.
//!
//! Resolution is deferred: [`crate::model::MirrorSpec`] carries raw
//! `${VAR}` tokens verbatim, and only `resolve_credentials` substitutes
//! them, so that parsing and rendering stay pure and directly testable
//! without touching the environment.

/// Resolve a single credential field, substituting every `${VAR}` token
/// with the corresponding environment variable. An undefined variable
/// resolves to the empty string rather than failing.
#[must_use]
pub fn resolve_credentials(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = raw[i + 2..].find('}') {
                let var_name = &raw[i + 2..i + 2 + end];
                out.push_str(&std::env::var(var_name).unwrap_or_default());
                i += 2 + end + 1;
                continue;
            }
        }
        out.push(raw[i..].chars().next().unwrap());
        i += raw[i..].chars().next().unwrap().len_utf8();
    }
    out
}
