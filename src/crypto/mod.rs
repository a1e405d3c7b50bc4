//! AES-256-GCM encryption and per-type key derivation for GO2 containers.
//!
//! Key schedule:
//!   master key   = Argon2id(secret, salt = [`MASTER_SALT`])     (once per process)
//!   type key     = BLAKE3-derive_key([`TYPE_KEY_CONTEXT`], master ‖ tag)
//!
//! Encryption: AES-256-GCM, random nonce prepended, the container tag bound
//! as associated data.
//!
//! Encrypted payload layout: [ nonce (12 B) | ciphertext | GCM tag (16 B) ]

use argon2::{Argon2, Algorithm, Version, Params};
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng, Payload};
use aes_gcm::Aes256Gcm;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::header::Tag;

/// Byte length of the AES-GCM nonce prepended to every encrypted payload.
pub const NONCE_LEN: usize = 12;
/// Byte length of the GCM authentication tag appended to every payload.
pub const AUTH_TAG_LEN: usize = 16;
/// Smallest well-formed encrypted payload (empty plaintext).
pub const MIN_PAYLOAD_LEN: usize = NONCE_LEN + AUTH_TAG_LEN;

/// Fixed Argon2 salt. Every packer instance must derive the same master key
/// from the same secret, so the salt cannot be random.
pub const MASTER_SALT: &[u8] = b"go2pack/master-key/v1";
/// BLAKE3 KDF context for per-type keys.
pub const TYPE_KEY_CONTEXT: &str = "go2pack 2024-01-01 asset container type key";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed — wrong key, wrong type tag or corrupted data")]
    DecryptionFailed,
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("Encrypted payload is {len} bytes (minimum {min} bytes)", min = MIN_PAYLOAD_LEN)]
    TooShort { len: usize },
}

/// Argon2id cost parameters for stretching the secret into a master key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    pub memory_kib:  u32,
    pub iterations:  u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self { memory_kib: 64 * 1024, iterations: 3, parallelism: 1 }
    }
}

/// 256-bit symmetric key for one asset type.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyMaterial([u8; 32]);

impl KeyMaterial {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

/// Stretch `secret` into a 256-bit master key using Argon2id.
pub fn derive_master_key(secret: &str, params: &KdfParams) -> Result<[u8; 32], CryptoError> {
    let params = Params::new(params.memory_kib, params.iterations, params.parallelism, Some(32))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = [0u8; 32];
    argon2
        .hash_password_into(secret.as_bytes(), MASTER_SALT, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Derive the key for one asset type from the master key and its wire tag.
///
/// Deterministic: the same master key and tag always give the same key, and
/// different tags never share one.
pub fn derive_type_key(master: &[u8; 32], tag: Tag) -> KeyMaterial {
    let mut material = Vec::with_capacity(32 + tag.as_bytes().len());
    material.extend_from_slice(master);
    material.extend_from_slice(tag.as_bytes());
    KeyMaterial(blake3::derive_key(TYPE_KEY_CONTEXT, &material))
}

/// Encrypt `plaintext` with AES-256-GCM using a random nonce.
///
/// `aad` is authenticated but not encrypted. Returns
/// `nonce (12 B) || ciphertext || GCM-tag (16 B)`.
pub fn encrypt(key: &KeyMaterial, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|_| CryptoError::EncryptionFailed)?;
    let nonce = Aes256Gcm::generate_nonce(&mut AeadOsRng);
    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt an AES-256-GCM payload produced by [`encrypt`] with the same `aad`.
pub fn decrypt(key: &KeyMaterial, data: &[u8], aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < MIN_PAYLOAD_LEN {
        return Err(CryptoError::TooShort { len: data.len() });
    }
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    let nonce = aes_gcm::Nonce::from_slice(&data[..NONCE_LEN]);
    cipher
        .decrypt(nonce, Payload { msg: &data[NONCE_LEN..], aad })
        .map_err(|_| CryptoError::DecryptionFailed)
}
