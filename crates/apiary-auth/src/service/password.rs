//! bcrypt password hashing

use std::sync::LazyLock;

use anyhow::Context;

/// Hash checked when a login names an unknown user, so that both login
/// failures cost one bcrypt verification.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("apiary-dummy-password").unwrap_or_default());

/// Hash with the library default cost
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")
}

/// Compare a plaintext password with a stored hash. A malformed hash counts
/// as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Spend the same work as [`verify_password`] without a stored hash
pub fn verify_dummy_password(password: &str) {
    let _ = verify_password(password, &DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("pw").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("pw", &hash));
        assert!(!verify_password("PW", &hash));
    }

    #[test]
    fn test_dummy_hash_is_real_bcrypt() {
        assert!(DUMMY_HASH.starts_with(&format!("$2b${}$", bcrypt::DEFAULT_COST)));
        assert!(!verify_password("pw", &DUMMY_HASH));
        verify_dummy_password("pw");
    }

    #[test]
    fn test_garbage_hash_is_mismatch() {
        assert!(!verify_password("pw", "not-a-hash"));
    }
}
