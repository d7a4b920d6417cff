// crates/pcbook-core/src/crypto.rs

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::CatalogError;

/// An ed25519 keypair derived deterministically from a shared secret.
///
/// The same secret always yields the same keypair, so tokens issued before a
/// server restart stay valid afterwards.
pub struct SecretKeypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl SecretKeypair {
    /// Derive a keypair using `sha256(secret)` as the ed25519 seed.
    pub fn from_secret(secret: &str) -> Result<Self, CatalogError> {
        if secret.is_empty() {
            return Err(CatalogError::Crypto("signing secret must not be empty".to_string()));
        }
        let seed = hash_bytes(secret.as_bytes());
        let signing_key = SigningKey::from_bytes(&seed);
        let verifying_key = signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// Sign a message and return the signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    /// Verify a signature produced by `sign`.
    pub fn verify(&self, message: &[u8], signature_bytes: &[u8]) -> Result<(), CatalogError> {
        let signature_array: [u8; 64] = signature_bytes
            .try_into()
            .map_err(|_| CatalogError::Crypto("Signature must be exactly 64 bytes".to_string()))?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature_array);
        self.verifying_key.verify(message, &signature)?;
        Ok(())
    }
}

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// Output is a PHC string (`$argon2id$v=19$...`) carrying the salt and
/// parameters, so verification needs nothing else.
pub fn hash_password(password: &str) -> Result<String, CatalogError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CatalogError::Crypto(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a value produced by `hash_password`.
///
/// The salt and cost parameters come from the stored string. Digests are
/// compared in constant time (`password_hash::Output` equality). Malformed
/// stored hashes never match.
pub fn verify_password(hashed: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
