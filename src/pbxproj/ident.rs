//! Deterministic object identifiers.
//!
//! Xcode names every object with 24 upper-case hex characters. New objects get
//! an identifier derived from a semantic key, so adding the same file twice
//! always yields the same identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PatchError;

/// Width of an Xcode object identifier.
pub const IDENTIFIER_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Derive the identifier for `key`.
    pub fn generate(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut id = hex::encode_upper(digest);
        id.truncate(IDENTIFIER_LEN);
        Self(id)
    }

    /// Wrap text already matched by an identifier pattern.
    pub(crate) fn from_matched(text: &str) -> Self {
        Self(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != IDENTIFIER_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PatchError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Identifier {
    type Error = PatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
