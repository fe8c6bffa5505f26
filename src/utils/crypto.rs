use sha2::{Digest, Sha512};

/// Deterministic fixed-salt SHA-512 hash. Login matches users by stored
/// hash equality, so the transform must be repeatable for a given salt.
pub fn hash_password(salt: &str, plain: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(plain.as_bytes());
    let digest = hasher.finalize();

    let mut out = Vec::with_capacity(salt.len() + digest.len());
    out.extend_from_slice(salt.as_bytes());
    out.extend_from_slice(&digest);
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_input() {
        assert_eq!(hash_password("s", "pw"), hash_password("s", "pw"));
    }

    #[test]
    fn salt_and_password_both_change_the_hash() {
        assert_ne!(hash_password("a", "pw"), hash_password("b", "pw"));
        assert_ne!(hash_password("a", "pw"), hash_password("a", "pw2"));
    }

    #[test]
    fn cleartext_never_appears_in_output() {
        let hashed = hash_password("salt", "hunter2");
        assert!(!hashed.contains("hunter2"));
    }
}
