//! Container header: a fixed-width ASCII type tag.
//!
//! Layout of every container:
//! ```text
//! [ tag (5 B) | ciphertext ]
//! ```
//! There is no length field, version or magic beyond the tag itself. A
//! reader identifies the payload type by comparing the first [`TAG_LEN`]
//! bytes against the registered tags before any decryption is attempted.

use std::fmt;
use thiserror::Error;

/// Width of the tag prefix in bytes.
pub const TAG_LEN: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Container is {len} bytes, shorter than the {min}-byte tag", min = TAG_LEN)]
    TooShort { len: usize },
}

/// A 5-byte wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    pub const fn new(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Foreign or corrupted tags are not guaranteed to be ASCII.
        write!(f, "{}", self.0.escape_ascii())
    }
}

/// Start a container buffer with `tag` and room for `payload_len` more bytes.
pub fn write_tag(tag: Tag, payload_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(TAG_LEN + payload_len);
    out.extend_from_slice(tag.as_bytes());
    out
}

/// Split a container into its tag and the remaining payload.
pub fn split_container(container: &[u8]) -> Result<(Tag, &[u8]), HeaderError> {
    if container.len() < TAG_LEN {
        return Err(HeaderError::TooShort { len: container.len() });
    }
    let (head, payload) = container.split_at(TAG_LEN);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(head);
    Ok((Tag(tag), payload))
}
