use ring::{digest, pbkdf2, rand::SecureRandom, rand::SystemRandom};
use std::num::NonZeroU32;
use thiserror::Error;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

const ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
const SCHEME: &str = "pbkdf2-sha256";

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Random number generation failed")]
    Rng,

    #[error("Stored hash is malformed")]
    MalformedHash,
}

/// Hashes a password with PBKDF2-HMAC-SHA256 and a random per-user salt.
///
/// Stored format: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`, so
/// the parameters travel with the hash and can be raised later without
/// invalidating existing accounts.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let rng = SystemRandom::new();

    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| PasswordError::Rng)?;

    let mut credential = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(
        ALGORITHM,
        ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut credential,
    );

    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        ITERATIONS,
        hex::encode(salt),
        hex::encode(credential)
    ))
}

/// Verifies a password against a stored hash in constant time.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let mut parts = stored.split('$');

    let scheme = parts.next().ok_or(PasswordError::MalformedHash)?;
    if scheme != SCHEME {
        return Err(PasswordError::MalformedHash);
    }

    let iterations: u32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(PasswordError::MalformedHash)?;
    let iterations = NonZeroU32::new(iterations).ok_or(PasswordError::MalformedHash)?;

    let salt = parts
        .next()
        .and_then(|s| hex::decode(s).ok())
        .ok_or(PasswordError::MalformedHash)?;
    let expected = parts
        .next()
        .and_then(|s| hex::decode(s).ok())
        .ok_or(PasswordError::MalformedHash)?;

    if parts.next().is_some() {
        return Err(PasswordError::MalformedHash);
    }

    Ok(pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &expected).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("incorrect horse", &hash).unwrap());
    }

    #[test]
    fn test_hashing_is_salted() {
        let hash1 = hash_password("same password").unwrap();
        let hash2 = hash_password("same password").unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);

        assert!(verify_password("same password", &hash1).unwrap());
        assert!(verify_password("same password", &hash2).unwrap());
    }

    #[test]
    fn test_stored_format() {
        let hash = hash_password("pw12345678").unwrap();
        let parts: Vec<&str> = hash.split('$').collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2-sha256");
        assert_eq!(parts[1], "100000");
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(matches!(
            verify_password("pw", "not-a-hash"),
            Err(PasswordError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("pw", "bcrypt$10$aa$bb"),
            Err(PasswordError::MalformedHash)
        ));
        assert!(matches!(
            verify_password("pw", "pbkdf2-sha256$0$aa$bb"),
            Err(PasswordError::MalformedHash)
        ));
    }
}
