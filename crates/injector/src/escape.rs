//! POSIX single-quote shell escaping, used to safely interpolate the
//! certs.d directory path into the injector's exec command.

/// Wrap `s` in single quotes, rewriting every embedded `'` as `'\''` —
/// the standard POSIX trick for quoting a string that may itself contain
/// single quotes. The result, when evaluated by `sh -c`, recovers `s`
/// byte-for-byte; no shell metacharacter inside `s` can escape the quotes.
#[must_use]
pub fn shell_single_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}
