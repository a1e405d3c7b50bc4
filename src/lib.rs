pub mod asset;
pub mod codec;
pub mod config;
pub mod container;
pub mod crypto;
pub mod hash;
pub mod header;
pub mod manifest;
pub mod registry;
pub mod tree;

pub use asset::AssetType;
pub use config::PackerConfig;
pub use container::{decode, encode, ContainerError, Decoded, Encoded};
pub use hash::ContentHash;
pub use manifest::{FileVersion, Manifest};
pub use registry::{Profile, Registry};
