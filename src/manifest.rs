//! Version manifest written next to the packaged tree.
//!
//! The game client downloads this list to decide which containers changed.
//! The JSON field names are fixed by the client (`FileName`, `Hash`).

use std::fs;
use std::io;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// One encoded asset: its logical name and the hash of its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Hash")]
    pub hash: ContentHash,
}

/// Ordered list of [`FileVersion`] records, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub files: Vec<FileVersion>,
}

impl Manifest {
    pub fn push(&mut self, file_name: impl Into<String>, hash: ContentHash) {
        self.files.push(FileVersion { file_name: file_name.into(), hash });
    }

    pub fn get(&self, file_name: &str) -> Option<&ContentHash> {
        self.files.iter().find(|f| f.file_name == file_name).map(|f| &f.hash)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let bytes = self.to_bytes().map_err(io::Error::from)?;
        fs::write(path, bytes)
    }

    pub fn read_from<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_client_expects() {
        let mut m = Manifest::default();
        m.push("gamedata/ui/main", ContentHash::from([0u8; 32]));
        let json = String::from_utf8(m.to_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            format!(r#"[{{"FileName":"gamedata/ui/main","Hash":"{}"}}]"#, "0".repeat(64)),
        );
    }

    #[test]
    fn lookup_by_name() {
        let mut m = Manifest::default();
        let h = ContentHash::of(b"x");
        m.push("gamedata/a", h);
        assert_eq!(m.get("gamedata/a"), Some(&h));
        assert_eq!(m.get("gamedata/b"), None);
        assert_eq!(Manifest::from_bytes(&m.to_bytes().unwrap()).unwrap(), m);
    }
}
