//! The GO2 container pipeline.
//!
//! ```text
//! encode:  raw ─compress─▶ packed ─encrypt(aad = tag)─▶ ct ─prefix tag─▶ container
//! decode:  container ─split tag─▶ type ─decrypt─▶ packed ─decompress─▶ raw
//! ```
//!
//! Every successful [`encode`] has already decoded its own output and
//! compared it with the input. A container that comes back from `encode`
//! is therefore known to be recoverable with the same registry.
//!
//! ```no_run
//! use go2pack::{AssetType, Registry, container};
//!
//! let registry = Registry::from_master_key([7u8; 32]);
//! let encoded = container::encode(&registry, b"var a = 1;", AssetType::Script)?;
//! let decoded = container::decode(&registry, &encoded.container)?;
//! assert_eq!(decoded.data, b"var a = 1;");
//! assert_eq!(decoded.asset_type, AssetType::Script);
//! # Ok::<(), go2pack::ContainerError>(())
//! ```

use thiserror::Error;
use tracing::{debug, error};

use crate::asset::AssetType;
use crate::codec::{get_codec, CodecError};
use crate::crypto::{self, CryptoError};
use crate::hash::ContentHash;
use crate::header::{self, HeaderError, Tag, TAG_LEN};
use crate::registry::{Registry, RegistryError};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("No profile registered for asset type '{0}'")]
    UnknownAssetType(AssetType),
    #[error("Unknown container tag '{0}'")]
    UnknownTag(Tag),
    #[error("Malformed container: {len} bytes, need at least {min}", min = TAG_LEN)]
    MalformedContainer { len: usize },
    #[error("Decryption failed: {0}")]
    DecryptionFailed(CryptoError),
    #[error("Corrupt compressed stream: {0}")]
    CorruptStream(CodecError),
    #[error("Encryption failed: {0}")]
    EncryptionFailed(CryptoError),
    #[error("Compression failed: {0}")]
    CompressionFailed(CodecError),
    /// The encoder produced a container it cannot decode back to its input.
    /// This is a pipeline bug, never a property of the input.
    #[error("Round-trip self-check failed for {asset_type} asset ({len} bytes)")]
    RoundTripViolation { asset_type: AssetType, len: usize },
    #[error("Content hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: ContentHash, actual: ContentHash },
}

impl From<RegistryError> for ContainerError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownAssetType(t) => ContainerError::UnknownAssetType(t),
            RegistryError::UnknownTag(t)       => ContainerError::UnknownTag(t),
        }
    }
}

impl From<HeaderError> for ContainerError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::TooShort { len } => ContainerError::MalformedContainer { len },
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;

// ── Outputs ──────────────────────────────────────────────────────────────────

/// Result of [`encode`].
#[derive(Debug, Clone)]
pub struct Encoded {
    pub container:  Vec<u8>,
    pub hash:       ContentHash,
    pub asset_type: AssetType,
}

/// Result of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub data:       Vec<u8>,
    pub asset_type: AssetType,
}

// ── Encode ───────────────────────────────────────────────────────────────────

/// Compress, encrypt and tag `raw` as `asset_type`, then prove the result
/// decodes back to `raw`.
pub fn encode(registry: &Registry, raw: &[u8], asset_type: AssetType) -> Result<Encoded> {
    let profile = registry.profile_for(asset_type)?;

    let packed = get_codec(profile.codec)
        .compress(raw, profile.level)
        .map_err(ContainerError::CompressionFailed)?;
    debug!(%asset_type, codec = profile.codec.name(), raw = raw.len(), packed = packed.len(), "compressed");

    let ciphertext = crypto::encrypt(&profile.key, &packed, profile.tag.as_bytes())
        .map_err(ContainerError::EncryptionFailed)?;

    let mut container = header::write_tag(profile.tag, ciphertext.len());
    container.extend_from_slice(&ciphertext);

    let hash = ContentHash::of(raw);

    self_check(registry, &container, raw, asset_type)?;

    Ok(Encoded { container, hash, asset_type })
}

fn self_check(registry: &Registry, container: &[u8], raw: &[u8], asset_type: AssetType) -> Result<()> {
    let violation = || ContainerError::RoundTripViolation { asset_type, len: raw.len() };
    match decode(registry, container) {
        Ok(back) if back.asset_type == asset_type && back.data == raw => Ok(()),
        Ok(back) => {
            error!(%asset_type, decoded_as = %back.asset_type, decoded_len = back.data.len(),
                   "self-check decoded different bytes");
            Err(violation())
        }
        Err(e) => {
            error!(%asset_type, error = %e, "self-check could not decode fresh container");
            Err(violation())
        }
    }
}

// ── Decode ───────────────────────────────────────────────────────────────────

/// Identify, decrypt and decompress a container.
///
/// The content hash is not checked here; use [`decode_verified`] when a
/// manifest hash is at hand.
pub fn decode(registry: &Registry, container: &[u8]) -> Result<Decoded> {
    let (tag, ciphertext) = header::split_container(container)?;
    let asset_type = registry.type_for_tag(&tag)?;
    let profile = registry.profile_for(asset_type)?;

    let packed = crypto::decrypt(&profile.key, ciphertext, tag.as_bytes())
        .map_err(ContainerError::DecryptionFailed)?;
    let data = get_codec(profile.codec)
        .decompress(&packed)
        .map_err(ContainerError::CorruptStream)?;
    debug!(%asset_type, container = container.len(), raw = data.len(), "decoded");

    Ok(Decoded { data, asset_type })
}

/// [`decode`], then compare the content hash of the result with `expected`.
pub fn decode_verified(registry: &Registry, container: &[u8], expected: &ContentHash) -> Result<Decoded> {
    let decoded = decode(registry, container)?;
    let actual = ContentHash::of(&decoded.data);
    if actual != *expected {
        return Err(ContainerError::HashMismatch { expected: *expected, actual });
    }
    Ok(decoded)
}

/// Read only the header and report the payload type. Nothing is decrypted.
pub fn peek_type(registry: &Registry, container: &[u8]) -> Result<AssetType> {
    let (tag, _) = header::split_container(container)?;
    Ok(registry.type_for_tag(&tag)?)
}
