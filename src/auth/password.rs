use bcrypt::{hash, verify, DEFAULT_COST};

/// One-way salted hash for storage. Plaintext is never persisted.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verify a password against a stored hash. Constant-time via bcrypt.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

/// Burn a bcrypt verification against a throwaway hash. Called when login
/// hits an unknown email so that path costs the same as a real mismatch
/// and the caller can return the identical "Invalid credentials" error.
pub fn verify_dummy(password: &str) {
    // A valid bcrypt hash of an unguessable random string.
    const DUMMY_HASH: &str = "$2b$12$4RmQAEjzX3p0D7QmLpXS0eS3tWvW1bJNV9VzUqAY1u5F0cB2C6u7m";
    let _ = verify(password, DUMMY_HASH);
}
