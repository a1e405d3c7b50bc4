//! Packer configuration.
//!
//! All fields have defaults matching the layout the game client expects, so
//! the tool runs without a config file. A TOML file may override any of
//! them:
//!
//! ```toml
//! source_dir    = "client"
//! packaged_dir  = "gamedata"
//! manifest_path = "gamedata.json"
//! secret        = "change me"
//!
//! [kdf]
//! memory_kib  = 65536
//! iterations  = 3
//! parallelism = 1
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{CryptoError, KdfParams};
use crate::registry::Registry;

/// Secret used when neither the config file nor the environment sets one.
pub const DEFAULT_SECRET: &str = "GalaxyOrbit2/GO2SWFCompiler";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Key derivation failed: {0}")]
    Key(#[from] CryptoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Tree holding the raw assets.
    pub source_dir:    PathBuf,
    /// Tree receiving `.go2` containers; mirrors `source_dir`.
    pub packaged_dir:  PathBuf,
    pub manifest_path: PathBuf,
    pub secret:        String,
    pub kdf:           KdfParams,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            source_dir:    PathBuf::from("client"),
            packaged_dir:  PathBuf::from("gamedata"),
            manifest_path: PathBuf::from("gamedata.json"),
            secret:        DEFAULT_SECRET.to_owned(),
            kdf:           KdfParams::default(),
        }
    }
}

impl PackerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("secret must not be empty".into()));
        }
        if self.source_dir == self.packaged_dir {
            return Err(ConfigError::Invalid(format!(
                "source_dir and packaged_dir are both {}",
                self.source_dir.display()
            )));
        }
        if self.kdf.iterations == 0 {
            return Err(ConfigError::Invalid("kdf.iterations must be at least 1".into()));
        }
        Ok(())
    }

    /// Derive keys and build the type registry. Expensive: runs Argon2id once.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        Ok(Registry::from_secret(&self.secret, &self.kdf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(PackerConfig::from_toml("").unwrap(), PackerConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let cfg = PackerConfig::from_toml(
            "packaged_dir = \"out\"\nsecret = \"s3cret\"\n[kdf]\nmemory_kib = 256\n",
        )
        .unwrap();
        assert_eq!(cfg.packaged_dir, PathBuf::from("out"));
        assert_eq!(cfg.source_dir, PathBuf::from("client"));
        assert_eq!(cfg.secret, "s3cret");
        assert_eq!(cfg.kdf.memory_kib, 256);
        assert_eq!(cfg.kdf.iterations, KdfParams::default().iterations);
    }

    #[test]
    fn same_source_and_packaged_dir_rejected() {
        let err = PackerConfig::from_toml("source_dir = \"x\"\npackaged_dir = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(matches!(
            PackerConfig::from_toml("secret = \"\"").unwrap_err(),
            ConfigError::Invalid(_),
        ));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(PackerConfig::from_toml("secret = ").unwrap_err(), ConfigError::Parse(_)));
    }
}
