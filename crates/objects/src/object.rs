//! Object handles
//!
//! An [`Object`] binds an optional [`Id`] to an optional linked collection.
//! It holds no document content: every accessor is a round trip to the
//! collection, so two handles on the same document always agree.
//!
//! Entity types wrap an `Object`, implement [`DatabaseObject`] and deref to
//! the wrapped handle, which gives every entity the accessors below.

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};

use chemdb_core::{Error, Id, Result};
use chemdb_storage::{including, CollectionPtr, FindOneAndUpdateOptions, FindOptions};

use crate::fields;

pub(crate) const ID_FIELD: &str = "_id";
pub(crate) const CREATED: &str = "_created";
pub(crate) const LAST_MODIFIED: &str = "_lastmodified";
pub(crate) const OBJECT_TYPE_FIELD: &str = "_objecttype";
pub(crate) const ANALYSIS_DISABLED: &str = "analysis_disabled";
pub(crate) const EXPLORATION_DISABLED: &str = "exploration_disabled";

/// Filter selecting one document by `_id`
pub(crate) fn id_filter(id: Id) -> Document {
    doc! { "_id": id }
}

/// Document header shared by every entity type
///
/// Both timestamps carry the same instant.
pub(crate) fn creation_header(object_type: &str) -> Document {
    let now = bson::DateTime::now();
    doc! {
        "_created": now,
        "_lastmodified": now,
        "_objecttype": object_type,
    }
}

/// A typed entity stored in a collection
pub trait DatabaseObject: Sized {
    /// Value of the `_objecttype` discriminator
    const OBJECT_TYPE: &'static str;

    /// Build a handle from an optional id and link
    fn from_parts(id: Option<Id>, collection: Option<CollectionPtr>) -> Self;

    /// The wrapped handle
    fn object(&self) -> &Object;

    /// The wrapped handle, mutably
    fn object_mut(&mut self) -> &mut Object;
}

/// Handle on one document
#[derive(Debug, Clone, Default)]
pub struct Object {
    id: Option<Id>,
    collection: Option<CollectionPtr>,
}

impl Object {
    /// Create a handle
    pub fn new(id: Option<Id>, collection: Option<CollectionPtr>) -> Self {
        Self { id, collection }
    }

    /// Identifier of the document
    ///
    /// # Errors
    /// Returns `Error::MissingId` if no identifier is assigned.
    pub fn id(&self) -> Result<Id> {
        self.id.ok_or(Error::MissingId)
    }

    /// Whether an identifier is assigned
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// The linked collection
    ///
    /// # Errors
    /// Returns `Error::MissingLinkedCollection` if the handle is detached.
    pub fn collection(&self) -> Result<&CollectionPtr> {
        self.collection.as_ref().ok_or(Error::MissingLinkedCollection)
    }

    /// Whether a collection is linked
    pub fn has_link(&self) -> bool {
        self.collection.is_some()
    }

    /// Link the handle to a collection
    pub fn link(&mut self, collection: CollectionPtr) {
        self.collection = Some(collection);
    }

    /// Drop the link to the collection; the id is kept
    pub fn detach(&mut self) {
        self.collection = None;
    }

    pub(crate) fn parts(&self) -> (Option<Id>, Option<CollectionPtr>) {
        (self.id, self.collection.clone())
    }

    /// Collection and id, checking the link first
    pub(crate) fn target(&self) -> Result<(&CollectionPtr, Id)> {
        let collection = self.collection()?;
        let id = self.id()?;
        Ok((collection, id))
    }

    /// Whether the document is present in the linked collection
    pub fn exists(&self) -> Result<bool> {
        let (collection, id) = self.target()?;
        Ok(collection.count(&id_filter(id))? > 0)
    }

    /// The complete stored document
    ///
    /// # Errors
    /// Returns `Error::IdNotFound` if the document is absent.
    pub fn raw_content(&self) -> Result<Document> {
        let (collection, id) = self.target()?;
        collection
            .find_one(&id_filter(id), FindOptions::default())?
            .ok_or(Error::IdNotFound)
    }

    /// The stored document as relaxed extended JSON
    pub fn json(&self) -> Result<String> {
        let content = self.raw_content()?;
        Ok(Bson::Document(content).into_relaxed_extjson().to_string())
    }

    /// Creation timestamp
    pub fn created(&self) -> Result<DateTime<Utc>> {
        self.timestamp(CREATED)
    }

    /// Timestamp of the last modification
    pub fn last_modified(&self) -> Result<DateTime<Utc>> {
        self.timestamp(LAST_MODIFIED)
    }

    fn timestamp(&self, field: &str) -> Result<DateTime<Utc>> {
        let (collection, id) = self.target()?;
        let doc = collection
            .find_one(&id_filter(id), FindOptions::projected(including([field])))?
            .ok_or(Error::IdNotFound)?;
        match doc.get(field) {
            Some(Bson::DateTime(dt)) => Ok(dt.to_chrono()),
            _ => Err(Error::MissingIdOrField),
        }
    }

    /// Whether the document carries a creation timestamp
    pub fn has_created_timestamp(&self) -> Result<bool> {
        fields::exists(self, CREATED)
    }

    /// Whether the document carries a modification timestamp
    pub fn has_last_modified_timestamp(&self) -> Result<bool> {
        fields::exists(self, LAST_MODIFIED)
    }

    /// Compare creation (or, with `modification`, last modification) times
    pub fn older_than(&self, other: &Object, modification: bool) -> Result<bool> {
        if modification {
            Ok(self.last_modified()? < other.last_modified()?)
        } else {
            Ok(self.created()? < other.created()?)
        }
    }

    /// Set the modification timestamp to now
    pub fn touch(&self) -> Result<()> {
        let (collection, id) = self.target()?;
        collection.find_one_and_update(
            &id_filter(id),
            &doc! { "$currentDate": { "_lastmodified": true } },
            FindOneAndUpdateOptions::projected(doc! { "_id": 1 }),
        )?;
        Ok(())
    }

    /// Delete the document and clear the id
    ///
    /// # Errors
    /// Returns `Error::IdNotFound` if `expect_presence` is set and the
    /// document is absent.
    pub fn wipe(&mut self, expect_presence: bool) -> Result<()> {
        let (collection, id) = self.target()?;
        let filter = id_filter(id);
        if expect_presence
            && collection
                .find_one(&filter, FindOptions::projected(doc! { "_id": 1 }))?
                .is_none()
        {
            return Err(Error::IdNotFound);
        }
        collection.delete_one(&filter)?;
        self.id = None;
        Ok(())
    }

    /// Whether the object is open for analysis
    pub fn analyze(&self) -> Result<bool> {
        Ok(!fields::get::<bool>(self, ANALYSIS_DISABLED)?)
    }

    /// Open the object for analysis
    pub fn enable_analysis(&self) -> Result<()> {
        fields::set(self, ANALYSIS_DISABLED, &false)
    }

    /// Close the object for analysis
    pub fn disable_analysis(&self) -> Result<()> {
        fields::set(self, ANALYSIS_DISABLED, &true)
    }

    /// Whether the object is open for exploration
    pub fn explore(&self) -> Result<bool> {
        Ok(!fields::get::<bool>(self, EXPLORATION_DISABLED)?)
    }

    /// Open the object for exploration
    pub fn enable_exploration(&self) -> Result<()> {
        fields::set(self, EXPLORATION_DISABLED, &false)
    }

    /// Close the object for exploration
    pub fn disable_exploration(&self) -> Result<()> {
        fields::set(self, EXPLORATION_DISABLED, &true)
    }
}

/// Declare an entity type wrapping an [`Object`]
macro_rules! database_object {
    ($(#[$meta:meta])* $name:ident, $object_type:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            object: $crate::object::Object,
        }

        impl $crate::object::DatabaseObject for $name {
            const OBJECT_TYPE: &'static str = $object_type;

            fn from_parts(
                id: Option<chemdb_core::Id>,
                collection: Option<chemdb_storage::CollectionPtr>,
            ) -> Self {
                Self {
                    object: $crate::object::Object::new(id, collection),
                }
            }

            fn object(&self) -> &$crate::object::Object {
                &self.object
            }

            fn object_mut(&mut self) -> &mut $crate::object::Object {
                &mut self.object
            }
        }

        impl $name {
            /// Handle on an existing document
            pub fn new(id: chemdb_core::Id, collection: chemdb_storage::CollectionPtr) -> Self {
                <Self as $crate::object::DatabaseObject>::from_parts(Some(id), Some(collection))
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::object::Object;

            fn deref(&self) -> &Self::Target {
                &self.object
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.object
            }
        }
    };
}

pub(crate) use database_object;
