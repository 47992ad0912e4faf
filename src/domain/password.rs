use anyhow::Result;

/// Password hashing contract. Callers treat the hash as an opaque string.
pub trait CredentialVerifier: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;

    /// A well-formed hash no password matches. Verifying against it costs
    /// the same as a real check, so a missing account is not faster to reject.
    fn decoy_hash(&self) -> &str;
}
