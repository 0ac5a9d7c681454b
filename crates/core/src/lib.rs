//! Core types for chemdb
//!
//! This crate defines the foundational types used throughout the system:
//! - Id: 12-byte ordered object identifier
//! - Error: Error type hierarchy
//! - Layout: persisted enum string tables and collection names
//! - Version: schema version of the database layout
//! - Settings: generic nested settings values (GenericValue, ValueCollection)
//! - Model: electronic structure model

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod layout;
pub mod model;
pub mod settings;
pub mod version;

pub use error::{Error, Result};
pub use id::{Id, ID_HEX_LENGTH};
pub use layout::{
    default_collection, internal_collection, CalculationStatus, ElementaryStepType,
    StructureLabel,
};
pub use model::Model;
pub use settings::{GenericValue, ParametrizedOptionValue, ValueCollection};
pub use version::Version;
