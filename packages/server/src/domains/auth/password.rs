//! Password hashing. bcrypt with the default cost keeps login latency
//! acceptable while staying resistant to offline cracking.

use anyhow::{Context, Result};

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("failed to hash password")
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("failed to verify password")
}
