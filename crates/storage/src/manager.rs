//! Manager: resolves named collections of one database
//!
//! The manager owns the in-process database: a map from collection name to
//! shared [`CollectionPtr`]. Collections outlive connect/disconnect cycles
//! and are only dropped by [`Manager::wipe`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bson::{doc, DateTime, Document};
use parking_lot::RwLock;
use tracing::{info, warn};

use chemdb_core::{internal_collection, Error, Result, Version};

use crate::collection::{CollectionPtr, FindOptions};
use crate::config::ManagerConfig;
use crate::memory::MemoryCollection;

/// Database manager
#[derive(Debug)]
pub struct Manager {
    config: ManagerConfig,
    collections: RwLock<BTreeMap<String, CollectionPtr>>,
    connected: AtomicBool,
}

impl Manager {
    /// Create a disconnected manager
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            collections: RwLock::new(BTreeMap::new()),
            connected: AtomicBool::new(false),
        })
    }

    /// Connected and initialised manager with the default configuration
    pub fn in_memory() -> Result<Self> {
        let manager = Self::new(ManagerConfig::default())?;
        manager.connect(false)?;
        manager.init()?;
        Ok(manager)
    }

    /// Active configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Name of the managed database
    pub fn database_name(&self) -> &str {
        &self.config.database_name
    }

    /// Connect to the database
    ///
    /// A database that already holds structures is version-checked when
    /// `check_version` is set. `expect_content` requires such a database.
    ///
    /// # Errors
    /// Returns `Error::VersionMismatch` or `Error::MissingCollection`; the
    /// manager stays disconnected in both cases.
    pub fn connect(&self, expect_content: bool) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        let result = self.check_on_connect(expect_content);
        if result.is_err() {
            self.connected.store(false, Ordering::SeqCst);
        }
        result
    }

    fn check_on_connect(&self, expect_content: bool) -> Result<()> {
        if self.has_collection(&self.config.collections.structures)? {
            if self.config.check_version {
                let found = self.db_version()?;
                if !found.is_compatible_with_wrapper() {
                    warn!(
                        target: "chemdb::manager",
                        database = %self.config.database_name,
                        %found,
                        expected = %Version::wrapper(),
                        "Database version does not match the wrapper"
                    );
                    return Err(Error::VersionMismatch {
                        expected: Version::wrapper().to_string(),
                        found: found.to_string(),
                    });
                }
            }
        } else if expect_content {
            return Err(Error::MissingCollection);
        }
        Ok(())
    }

    /// Drop the connection; stored data is kept
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Whether the manager is connected
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::Disconnected)
        }
    }

    /// Create the default collections and the meta data document
    ///
    /// Collections that already exist are left untouched.
    pub fn init(&self) -> Result<()> {
        self.ensure_connected()?;
        let mut collections = self.collections.write();
        for name in self.config.collections.all() {
            if !collections.contains_key(name) {
                collections.insert(name.to_string(), Arc::new(MemoryCollection::new(name)));
            }
        }
        if !collections.contains_key(internal_collection::META) {
            let meta: CollectionPtr = Arc::new(MemoryCollection::new(internal_collection::META));
            meta.insert_one(doc! {
                "_created": DateTime::now(),
                "version": {
                    "major": Version::MAJOR,
                    "minor": Version::MINOR,
                    "patch": Version::PATCH,
                },
            })?;
            collections.insert(internal_collection::META.to_string(), meta);
            info!(
                target: "chemdb::manager",
                database = %self.config.database_name,
                version = %Version::wrapper(),
                "Initialised database"
            );
        }
        Ok(())
    }

    /// Whether a collection exists
    pub fn has_collection(&self, name: &str) -> Result<bool> {
        self.ensure_connected()?;
        Ok(self.collections.read().contains_key(name))
    }

    /// Shared handle to an existing collection
    ///
    /// # Errors
    /// Returns `Error::MissingCollection` if the collection does not exist.
    pub fn get_collection(&self, name: &str) -> Result<CollectionPtr> {
        self.ensure_connected()?;
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or(Error::MissingCollection)
    }

    /// Create a collection, or return it if it already exists
    pub fn create_collection(&self, name: &str) -> Result<CollectionPtr> {
        self.ensure_connected()?;
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "collection name must not be empty".to_string(),
            ));
        }
        let mut collections = self.collections.write();
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(target: "chemdb::manager", collection = name, "Created collection");
                Arc::new(MemoryCollection::new(name))
            })
            .clone();
        Ok(collection)
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Result<Vec<String>> {
        self.ensure_connected()?;
        Ok(self.collections.read().keys().cloned().collect())
    }

    /// Drop every collection of the database
    pub fn wipe(&self) -> Result<()> {
        self.ensure_connected()?;
        self.collections.write().clear();
        warn!(target: "chemdb::manager", database = %self.config.database_name, "Wiped database");
        Ok(())
    }

    /// Schema version stored in the meta data; `0.0.0` without meta data
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` if the meta document is malformed.
    pub fn db_version(&self) -> Result<Version> {
        self.ensure_connected()?;
        let meta = match self.collections.read().get(internal_collection::META) {
            Some(meta) => Arc::clone(meta),
            None => return Ok(Version { major: 0, minor: 0, patch: 0 }),
        };
        let doc = match meta.find_one(&Document::new(), FindOptions::default())? {
            Some(doc) => doc,
            None => return Ok(Version { major: 0, minor: 0, patch: 0 }),
        };
        let version = doc.get_document("version").map_err(|_| Error::MissingIdOrField)?;
        let part = |key: &str| version.get_i32(key).map_err(|_| Error::MissingIdOrField);
        Ok(Version {
            major: part("major")?,
            minor: part("minor")?,
            patch: part("patch")?,
        })
    }

    /// Whether the stored schema version matches the wrapper in major and minor
    pub fn version_matches_wrapper(&self) -> Result<bool> {
        Ok(self.db_version()?.is_compatible_with_wrapper())
    }
}
