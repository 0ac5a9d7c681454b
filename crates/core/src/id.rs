//! Object identifiers
//!
//! An [`Id`] is a 12-byte, globally ordered object identifier: a 4-byte
//! timestamp, 5 process-random bytes and a 3-byte counter, generated by the
//! document driver. Ids compare byte-wise, so ids generated later in the same
//! process sort after earlier ones.

use bson::oid::ObjectId;
use bson::Bson;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of hex characters in the textual form of an id
pub const ID_HEX_LENGTH: usize = 24;

/// Unique identifier of a stored document
///
/// Ids are immutable value types. `Id::new()` always generates a fresh value;
/// [`Id::from_hex`] and [`Id::from_bytes`] wrap an existing one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Id(ObjectId);

impl Id {
    /// Generate a new, globally unique id
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Wrap a raw 12-byte value
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(ObjectId::from_bytes(bytes))
    }

    /// Parse exactly 24 hex characters
    ///
    /// # Errors
    /// Returns `Error::InvalidId` if the length is not 24 or a character is not a hex digit.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != ID_HEX_LENGTH {
            return Err(Error::InvalidId(format!(
                "expected {} hex characters, got {}",
                ID_HEX_LENGTH,
                s.len()
            )));
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(Error::InvalidId(format!("invalid hex character '{}'", c)));
        }
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|e| Error::InvalidId(e.to_string()))
    }

    /// Lower-case hex representation (24 characters)
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Raw 12-byte value
    pub fn bytes(&self) -> [u8; 12] {
        self.0.bytes()
    }

    /// The driver-level object id
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes().cmp(&other.bytes())
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_hex())
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<ObjectId> for Id {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<Id> for ObjectId {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl From<Id> for Bson {
    fn from(id: Id) -> Self {
        Bson::ObjectId(id.0)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.to_hex()
    }
}

impl TryFrom<String> for Id {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}
