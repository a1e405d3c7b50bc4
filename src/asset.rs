//! Asset categories understood by the packer.
//!
//! Each category corresponds to exactly one source file extension and one
//! 5-byte wire tag. The tags are frozen: they are the first bytes of every
//! shipped container and the client reads them to pick a decoder.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::header::{Tag, TAG_LEN};

/// Extension given to every packaged container, whatever its payload type.
pub const CONTAINER_EXTENSION: &str = "go2";

/// Closed set of supported asset categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Flash animation bundle (`.swf`).
    Animation,
    /// Client script (`.js`).
    Script,
    /// Audio clip (`.mp3`).
    Audio,
    /// Raster image (`.jpg`).
    Image,
    /// Markup / data file (`.xml`).
    Markup,
}

impl AssetType {
    pub const ALL: [AssetType; 5] = [
        AssetType::Animation,
        AssetType::Script,
        AssetType::Audio,
        AssetType::Image,
        AssetType::Markup,
    ];

    /// The frozen wire tag for this type.
    pub fn tag(self) -> Tag {
        let bytes: &[u8; TAG_LEN] = match self {
            AssetType::Animation => b"bngo2",
            AssetType::Script    => b"jsgo2",
            AssetType::Audio     => b"mpgo2",
            AssetType::Image     => b"imgo2",
            AssetType::Markup    => b"xmgo2",
        };
        Tag::new(*bytes)
    }

    /// Source extension, lowercase and without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            AssetType::Animation => "swf",
            AssetType::Script    => "js",
            AssetType::Audio     => "mp3",
            AssetType::Image     => "jpg",
            AssetType::Markup    => "xml",
        }
    }

    /// Map a source extension (case-insensitive, no dot) to its type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.extension() == ext)
    }

    pub fn name(self) -> &'static str {
        match self {
            AssetType::Animation => "animation",
            AssetType::Script    => "script",
            AssetType::Audio     => "audio",
            AssetType::Image     => "image",
            AssetType::Markup    => "markup",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
