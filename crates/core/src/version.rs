//! Schema version of the database layout

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema version written into, and checked against, the meta data collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Incompatible layout changes
    pub major: i32,
    /// Compatible additions that older wrappers may not understand
    pub minor: i32,
    /// Fixes without layout changes
    pub patch: i32,
}

impl Version {
    /// Major version of this wrapper
    pub const MAJOR: i32 = 1;
    /// Minor version of this wrapper
    pub const MINOR: i32 = 3;
    /// Patch version of this wrapper
    pub const PATCH: i32 = 0;

    /// Version implemented by this wrapper
    pub const fn wrapper() -> Self {
        Self {
            major: Self::MAJOR,
            minor: Self::MINOR,
            patch: Self::PATCH,
        }
    }

    /// Whether a database at this version can be used by the wrapper
    ///
    /// Only major and minor are compared.
    pub fn is_compatible_with_wrapper(&self) -> bool {
        self.major == Self::MAJOR && self.minor == Self::MINOR
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
