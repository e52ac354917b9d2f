use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use once_cell::sync::Lazy;

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);

    ARGON2
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// A stored hash that fails to parse counts as a failed match rather than a
/// panic; corrupted account data must not take the service down.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .map(|parsed| ARGON2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("s3cret");
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("S3cret", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "plaintext-from-old-build"));
    }
}
