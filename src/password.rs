use argon2::{
    password_hash::{rand_core::OsRng, Error as HashError, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};

/// Hashes a plaintext password with Argon2id and a fresh random salt.
/// The same plaintext hashed twice yields different PHC strings.
pub fn hash(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hashed.to_string())
}

/// Verifies a plaintext password against a stored PHC-string hash.
/// A stored hash that fails to parse counts as a failed verification,
/// never as a panic or an escaping error.
pub fn verify(stored_hash: &str, plaintext: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify(&hashed, "correct horse battery staple"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hashed = hash("secret1").unwrap();
        assert!(!verify(&hashed, "secret2"));
    }

    #[test]
    fn salts_make_hashes_differ() {
        let first = hash("secret1").unwrap();
        let second = hash("secret1").unwrap();
        assert_ne!(first, second);
        assert!(verify(&first, "secret1"));
        assert!(verify(&second, "secret1"));
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verify("not-a-phc-string", "secret1"));
        assert!(!verify("", "secret1"));
    }
}
