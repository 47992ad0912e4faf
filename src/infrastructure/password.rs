use crate::domain::password::CredentialVerifier;
use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Default Argon2id parameters over a fixed salt and digest
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bGlmdGxvZ2R1bW15c2FsdA$VztQOMbPVx/DUdHQvsbcPcTbc8l+qhlljxkng9HyyEE";

/// Argon2id credential verifier with a random salt per hash
#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(hash)
    }

    /// A malformed stored hash is an error, a wrong password is `Ok(false)`
    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn decoy_hash(&self) -> &str {
        DECOY_HASH
    }
}
