//! Randomised heredoc delimiter generation, to defeat content-injection
//! attacks against the injector's `cat > ... << DELIMITER` exec command.

use rand::RngCore;

/// Generate a fresh `EOF_<16 hex chars>` delimiter from 8 cryptographically
/// random bytes. Must be regenerated per exec — never reused — so that
/// colliding with attacker-controlled file content is infeasible
/// (collision probability <= 2^-64).
#[must_use]
pub fn random_delimiter() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("EOF_{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_expected_shape() {
        let delimiter = random_delimiter();
        assert_eq!(delimiter.len(), 20);
        assert!(delimiter.starts_with("EOF_"));
        assert!(delimiter[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn two_invocations_are_distinct() {
        let a = random_delimiter();
        let b = random_delimiter();
        assert_ne!(a, b);
    }
}
