//! chemdb - Typed object-document mapping for computational chemistry data
//!
//! chemdb stores structures, calculations, properties and elementary steps
//! as documents and hands out lightweight typed handles to them.
//!
//! # Quick Start
//!
//! ```ignore
//! use chemdb::{Manager, Structure, StructureLabel, Model};
//!
//! let manager = Manager::in_memory()?;
//! let structures = manager.get_collection("structures")?;
//! let water = Structure::create(&Model::default(), StructureLabel::UserGuess, 0, 1, &structures)?;
//! water.set_charge(-1)?;
//! ```
//!
//! # Architecture
//!
//! - `chemdb-core`: ids, errors, layout tables, settings values, models
//! - `chemdb-storage`: the collection trait, the in-memory backend and the
//!   manager
//! - `chemdb-objects`: entity handles and payload serialization

pub use chemdb_core::*;
pub use chemdb_objects::*;
pub use chemdb_storage::{
    Collection, CollectionNames, CollectionPtr, FindOneAndUpdateOptions, FindOptions, Manager,
    ManagerConfig, MemoryCollection, ReturnDocument, CONFIG_FILE_NAME,
};
