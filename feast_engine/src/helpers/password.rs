//! Password storage for the bundled account store.
//!
//! Passwords are hashed with Argon2id and stored as a single PHC string, which carries the salt and the cost
//! parameters along with the digest.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use feast_common::Secret;
use log::*;
use once_cell::sync::Lazy;

/// A hash of a password nobody knows. Sign-in attempts for unknown accounts are checked against it, so that they take
/// as long as attempts for real ones.
static DECOY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let decoy = SaltString::generate(&mut OsRng);
    hash_password(&Secret::new(decoy.as_str().to_string())).ok()
});

pub fn hash_password(password: &Secret<String>) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.reveal().as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `false` for a wrong password, and for a stored hash that cannot be parsed.
pub fn verify_password(password: &Secret<String>, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("🔑️ A stored password hash is not a valid PHC string. {e}");
            return false;
        },
    };
    Argon2::default().verify_password(password.reveal().as_bytes(), &parsed).is_ok()
}

/// Spends the same effort as [`verify_password`] and always fails.
pub fn verify_against_decoy(password: &Secret<String>) -> bool {
    if let Some(decoy) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, decoy);
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hashes_are_salted_phc_strings() {
        let password = Secret::from("hunter22");
        let h1 = hash_password(&password).unwrap();
        let h2 = hash_password(&password).unwrap();
        assert!(h1.starts_with("$argon2id$"));
        assert_ne!(h1, h2);
        assert!(verify_password(&password, &h1));
        assert!(verify_password(&password, &h2));
        assert!(!verify_password(&Secret::from("hunter23"), &h1));
    }

    #[test]
    fn garbage_hashes_never_verify() {
        assert!(!verify_password(&Secret::from("hunter22"), "not-a-hash"));
        assert!(!verify_password(&Secret::from("hunter22"), ""));
    }

    #[test]
    fn the_decoy_rejects_everything() {
        assert!(DECOY_HASH.is_some());
        assert!(!verify_against_decoy(&Secret::from("hunter22")));
        assert!(!verify_against_decoy(&Secret::from("")));
    }
}
