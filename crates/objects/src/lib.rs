//! Entity layer for chemdb
//!
//! Typed handles over documents in a [`Collection`](chemdb_storage::Collection):
//! - Object: id, collection link and the fields every document shares
//! - Fields: typed get/set of individual fields
//! - Serializer: payload layouts for scalars, vectors and matrices
//! - Property and its six typed variants
//! - Calculation, Structure, ElementaryStep
//! - CollectionExt: typed lookups on a collection handle
//!
//! Handles cache nothing but their id and collection; every accessor is one
//! round trip to the store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod object;
pub mod calculation;
pub mod derived_property;
pub mod elementary_step;
pub mod extensions;
pub mod fields;
pub mod property;
pub mod serializer;
pub mod structure;
pub mod value_collection;

pub use calculation::{Calculation, Job, Results, DEFAULT_PRIORITY};
pub use derived_property::DerivedProperty;
pub use elementary_step::{ElementaryStep, Side};
pub use extensions::CollectionExt;
pub use fields::FieldValue;
pub use object::{DatabaseObject, Object};
pub use property::{
    BoolProperty, DenseMatrixProperty, NumberProperty, Property, SparseMatrixProperty,
    StringProperty, VectorProperty,
};
pub use serializer::Serializer;
pub use structure::Structure;
