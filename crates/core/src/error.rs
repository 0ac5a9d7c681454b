//! Error types for chemdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every failure a caller may need to react to has its own variant. The only
//! failure that is *not* an error is a field codec reporting a type mismatch,
//! which is surfaced as `Ok(None)` by the field accessors.

use std::io;
use thiserror::Error;

/// Result type alias for chemdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chemdb
#[derive(Debug, Error)]
pub enum Error {
    /// The object has no collection linked to it
    #[error("Missing linked collection.")]
    MissingLinkedCollection,

    /// The object has no identifier assigned
    #[error("The object is missing an ID to be used in this context.")]
    MissingId,

    /// No collection handle was supplied, or the named collection does not exist
    #[error("The requested collection could not be found.")]
    MissingCollection,

    /// No document exists for the identifier
    #[error("No object with the given ID could be found.")]
    IdNotFound,

    /// The document or one of the requested fields is absent or has the wrong wire type
    #[error("The object with the given ID, or the requested field in it could not be found in the database.")]
    MissingIdOrField,

    /// The `_objecttype`/`_propertytype` discriminator differs from the requested type
    #[error("Object type mismatch: requested '{expected}', found '{found}'")]
    ObjectTypeMismatch {
        /// Discriminator of the requested type
        expected: String,
        /// Discriminator stored in the database
        found: String,
    },

    /// A 64-bit wire integer does not fit the 32-bit schema field
    #[error("The database contains the 64-bit integer {0} that cannot be represented as a 32-bit integer")]
    IntegerOverflow(i64),

    /// A nested list carries a type tag outside the known set
    #[error("Unrecognized list type '{0}'")]
    UnrecognizedListType(String),

    /// A nested generic value matched none of the known document shapes
    #[error("Unrecognized value shape: {0}")]
    UnrecognizedValueShape(&'static str),

    /// One element of an array field could not be decoded
    #[error("Failed to decode array element {index} as {expected}")]
    ArrayElementDecode {
        /// Position of the offending element
        index: usize,
        /// Expected element type
        expected: &'static str,
    },

    /// A stored size or shape does not agree with the stored payload
    #[error("Shape mismatch: expected {expected} elements, found {found}")]
    ShapeMismatch {
        /// Element count implied by the size fields
        expected: usize,
        /// Element count actually stored
        found: usize,
    },

    /// Malformed identifier string
    #[error("Invalid object id: {0}")]
    InvalidId(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The database schema version is not supported by this wrapper
    #[error("Database version {found} is not supported by this wrapper (expected {expected})")]
    VersionMismatch {
        /// Version supported by the wrapper
        expected: String,
        /// Version found in the database
        found: String,
    },

    /// The manager has no open connection
    #[error("The database is not connected.")]
    Disconnected,

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<bson::ser::Error> for Error {
    fn from(e: bson::ser::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl Error {
    /// Whether the error reports absent data rather than a malformed call
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::IdNotFound | Error::MissingIdOrField)
    }
}
