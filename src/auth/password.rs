use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use once_cell::sync::Lazy;

// Stands in for the stored hash when the username does not exist.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("no-such-account").ok());

/// Salted Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, password_hash::Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Costs one full verification without any account behind it, so an unknown
/// username takes as long to reject as a wrong password.
pub fn verify_dummy_password(password: &str) {
    if let Some(hashed) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hashed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash_password("secure_password_123").unwrap();

        assert_ne!(hashed, "secure_password_123");
        assert!(verify_password("secure_password_123", &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let hashed = DUMMY_HASH.as_deref().unwrap();

        assert!(PasswordHash::new(hashed).is_ok());
        assert!(!verify_password("s3cretpass", hashed).unwrap());
    }
}
