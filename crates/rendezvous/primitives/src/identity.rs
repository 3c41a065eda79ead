//! Overlay peer identities.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// URN prefix of every peer identity URI.
pub const PEER_URN_PREFIX: &str = "urn:overlay:";

/// Number of random bytes in a generated identity.
const RANDOM_IDENTITY_LEN: usize = 32;

/// Error returned when a value cannot be turned into a [`PeerIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("peer identity URI must start with `{PEER_URN_PREFIX}`: {0}")]
    BadScheme(String),
    #[error("peer identity unique value is empty")]
    Empty,
    #[error("peer identity unique value is not hex: {0}")]
    NotHex(String),
}

/// Globally unique, URI-shaped peer identity (`urn:overlay:<hex>`).
///
/// Only the unique value is stored; it is normalised to lowercase so that two
/// spellings of the same identity compare equal. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerIdentity(Arc<str>);

impl PeerIdentity {
    /// Build an identity from the hex part of its URI.
    pub fn from_unique_value(value: &str) -> Result<Self, IdentityError> {
        if value.is_empty() {
            return Err(IdentityError::Empty);
        }
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentityError::NotHex(value.to_owned()));
        }
        Ok(Self(value.to_ascii_lowercase().into()))
    }

    /// Generate a fresh random identity.
    pub fn random() -> Self {
        let bytes: [u8; RANDOM_IDENTITY_LEN] = rand::random();
        Self(hex::encode(bytes).into())
    }

    pub fn unique_value(&self) -> &str {
        &self.0
    }

    pub fn to_uri(&self) -> String {
        format!("{PEER_URN_PREFIX}{}", self.0)
    }
}

impl FromStr for PeerIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .strip_prefix(PEER_URN_PREFIX)
            .ok_or_else(|| IdentityError::BadScheme(s.to_owned()))?;
        Self::from_unique_value(value)
    }
}

impl TryFrom<String> for PeerIdentity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeerIdentity> for String {
    fn from(value: PeerIdentity) -> Self {
        value.to_uri()
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PEER_URN_PREFIX}{}", self.0)
    }
}

impl fmt::Debug for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        let short = self.0.get(..12).unwrap_or(&self.0);
        write!(f, "PeerIdentity({short})")
    }
}
