//! Type registry: asset type → (codec, level, key, tag).
//!
//! The registry is built once at startup and never mutated. Adding an asset
//! type means adding a row to [`default_settings`], not a new branch in the
//! pipeline.

use std::collections::HashMap;
use thiserror::Error;

use crate::asset::AssetType;
use crate::codec::CodecId;
use crate::crypto::{derive_master_key, derive_type_key, CryptoError, KdfParams, KeyMaterial};
use crate::header::Tag;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No profile registered for asset type '{0}'")]
    UnknownAssetType(AssetType),
    #[error("No registered asset type uses tag '{0}'")]
    UnknownTag(Tag),
}

/// Everything the pipeline needs to encode or decode one asset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub asset_type: AssetType,
    pub tag:        Tag,
    pub codec:      CodecId,
    pub level:      i32,
    pub key:        KeyMaterial,
}

/// Default compression choice per type.
///
/// Already-compressed media (mp3, jpg) only get a cheap LZ4 pass; text
/// formats get Brotli; animation bundles get high-level Zstd.
pub fn default_settings(asset_type: AssetType) -> (CodecId, i32) {
    match asset_type {
        AssetType::Animation => (CodecId::Zstd,   19),
        AssetType::Script    => (CodecId::Brotli, 11),
        AssetType::Audio     => (CodecId::Lz4,    0),
        AssetType::Image     => (CodecId::Lz4,    0),
        AssetType::Markup    => (CodecId::Brotli, 9),
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    by_type: HashMap<AssetType, Profile>,
}

impl Registry {
    /// Register every asset type with its default settings.
    pub fn from_master_key(master: [u8; 32]) -> Self {
        AssetType::ALL
            .into_iter()
            .fold(Self::builder(master), |b, t| b.register(t))
            .build()
    }

    /// Stretch `secret` with Argon2id and register every asset type.
    pub fn from_secret(secret: &str, params: &KdfParams) -> Result<Self, CryptoError> {
        Ok(Self::from_master_key(derive_master_key(secret, params)?))
    }

    pub fn builder(master: [u8; 32]) -> RegistryBuilder {
        RegistryBuilder { master, by_type: HashMap::new() }
    }

    pub fn profile_for(&self, asset_type: AssetType) -> Result<&Profile, RegistryError> {
        self.by_type
            .get(&asset_type)
            .ok_or(RegistryError::UnknownAssetType(asset_type))
    }

    /// Exact match over all [`TAG_LEN`](crate::header::TAG_LEN) bytes.
    pub fn type_for_tag(&self, tag: &Tag) -> Result<AssetType, RegistryError> {
        self.by_type
            .values()
            .find(|p| p.tag == *tag)
            .map(|p| p.asset_type)
            .ok_or(RegistryError::UnknownTag(*tag))
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.by_type.values()
    }
}

pub struct RegistryBuilder {
    master:  [u8; 32],
    by_type: HashMap<AssetType, Profile>,
}

impl RegistryBuilder {
    /// Register `asset_type` with its default codec and level.
    pub fn register(self, asset_type: AssetType) -> Self {
        let (codec, level) = default_settings(asset_type);
        self.register_with(asset_type, codec, level)
    }

    /// Register `asset_type` with an explicit codec and level. Re-registering
    /// a type replaces its previous profile.
    pub fn register_with(mut self, asset_type: AssetType, codec: CodecId, level: i32) -> Self {
        let tag = asset_type.tag();
        let profile = Profile {
            asset_type,
            tag,
            codec,
            level,
            key: derive_type_key(&self.master, tag),
        };
        self.by_type.insert(asset_type, profile);
        self
    }

    pub fn build(self) -> Registry {
        Registry { by_type: self.by_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_registered_by_default() {
        let reg = Registry::from_master_key([1u8; 32]);
        for t in AssetType::ALL {
            let p = reg.profile_for(t).unwrap();
            assert_eq!(p.asset_type, t);
            assert_eq!(reg.type_for_tag(&p.tag).unwrap(), t);
        }
    }

    #[test]
    fn partial_registry_rejects_missing_type() {
        let reg = Registry::builder([1u8; 32]).register(AssetType::Script).build();
        assert_eq!(
            reg.profile_for(AssetType::Audio).unwrap_err(),
            RegistryError::UnknownAssetType(AssetType::Audio),
        );
    }

    #[test]
    fn tag_lookup_is_exact() {
        let reg = Registry::from_master_key([1u8; 32]);
        assert!(reg.type_for_tag(&Tag::new(*b"jsgo3")).is_err());
        assert!(reg.type_for_tag(&Tag::new(*b"JSGO2")).is_err());
        assert_eq!(reg.type_for_tag(&Tag::new(*b"jsgo2")).unwrap(), AssetType::Script);
    }

    #[test]
    fn keys_differ_per_type_and_per_master() {
        let a = Registry::from_master_key([1u8; 32]);
        let b = Registry::from_master_key([2u8; 32]);
        let script = a.profile_for(AssetType::Script).unwrap().key;
        assert_ne!(script, a.profile_for(AssetType::Markup).unwrap().key);
        assert_ne!(script, b.profile_for(AssetType::Script).unwrap().key);
    }

    #[test]
    fn override_replaces_settings() {
        let reg = Registry::builder([0u8; 32])
            .register(AssetType::Image)
            .register_with(AssetType::Image, CodecId::Zstd, 1)
            .build();
        let p = reg.profile_for(AssetType::Image).unwrap();
        assert_eq!((p.codec, p.level), (CodecId::Zstd, 1));
    }
}
