use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id. A fresh salt is generated per call; the
/// PHC output string embeds algorithm, parameters and salt, so verification
/// needs nothing besides the digest itself.
pub fn hash(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)?
        .to_string();
    Ok(digest)
}

/// Constant-time verification. A mismatch or a malformed digest is false,
/// not an error.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let digest = hash("password123").unwrap();
        assert!(verify("password123", &digest));
    }

    #[test]
    fn wrong_password_is_false() {
        let digest = hash("password123").unwrap();
        assert!(!verify("password124", &digest));
    }

    #[test]
    fn malformed_digest_is_false() {
        assert!(!verify("password123", "not-a-phc-string"));
    }

    #[test]
    fn salts_differ_between_calls() {
        let a = hash("password123").unwrap();
        let b = hash("password123").unwrap();
        assert_ne!(a, b);
        assert!(verify("password123", &b));
    }
}
