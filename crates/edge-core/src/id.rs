//! Opaque identifiers minted by the control plane.

use uuid::Uuid;

/// Generate a fresh identifier for a server-owned record.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Whether `s` is a well-formed identifier (a hyphenated UUID).
pub fn is_valid(s: &str) -> bool {
    s.len() == 36 && Uuid::parse_str(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = new_id();
        let b = new_id();
        assert!(is_valid(&a));
        assert!(is_valid(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_malformed() {
        assert!(!is_valid(""));
        assert!(!is_valid("123"));
        assert!(!is_valid("not-a-uuid-at-all-but-thirty-six-ch"));
        // Simple (unhyphenated) form is not accepted.
        assert!(!is_valid("67e5504410b1426f9247bb680e5fe0c8"));
    }
}
