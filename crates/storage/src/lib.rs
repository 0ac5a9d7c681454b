//! Storage layer for chemdb
//!
//! This crate implements the document store the entity layer talks to:
//! - Collection: the collection trait and its find/update options
//! - MemoryCollection: BTreeMap-based collection with RwLock
//! - Filter, update and projection evaluators over `bson` documents
//! - Manager: resolves named collections and checks the schema version
//! - ManagerConfig: `chemdb.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod compare;
pub mod config;
pub mod filter;
pub mod manager;
pub mod memory;
pub mod path;
pub mod projection;
pub mod update;

pub use collection::{
    Collection, CollectionPtr, FindOneAndUpdateOptions, FindOptions, ReturnDocument,
};
pub use config::{CollectionNames, ManagerConfig, CONFIG_FILE_NAME};
pub use manager::Manager;
pub use memory::MemoryCollection;
pub use path::{get_path, has_path, remove_path, set_path};
pub use projection::including;
