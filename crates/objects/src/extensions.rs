//! Typed access to a collection
//!
//! [`CollectionExt`] turns raw documents into entity handles. Lookups only
//! fetch `_id` and `_objecttype`; the handles read everything else lazily.

use bson::{doc, Bson, Document};

use chemdb_core::{Error, Id, Result};
use chemdb_storage::{
    Collection, CollectionPtr, FindOneAndUpdateOptions, FindOptions, ReturnDocument,
};

use crate::object::{id_filter, DatabaseObject, ID_FIELD, OBJECT_TYPE_FIELD};

fn header_projection() -> Document {
    doc! { "_id": 1, "_objecttype": 1 }
}

/// Typed lookups on a shared collection handle
pub trait CollectionExt {
    /// Handle on the document with `id`
    ///
    /// # Errors
    /// Returns `Error::IdNotFound` if no such document exists.
    fn get<T: DatabaseObject>(&self, id: Id) -> Result<T>;

    /// Whether a document with `id` exists
    fn has(&self, id: Id) -> Result<bool>;

    /// Whether a document with `id` and the object type of `T` exists
    fn has_of_type<T: DatabaseObject>(&self, id: Id) -> Result<bool>;

    /// Id of the first document matching `filter`
    fn find_id(&self, filter: &Document) -> Result<Option<Id>>;

    /// Handle on the first document matching `filter`
    ///
    /// # Errors
    /// Returns `Error::ObjectTypeMismatch` if that document is not a `T`.
    fn get_one<T: DatabaseObject>(
        &self,
        filter: &Document,
        sort: Option<Document>,
    ) -> Result<Option<T>>;

    /// Atomically update the first document matching `filter` and return a
    /// handle on it
    ///
    /// # Errors
    /// Returns `Error::ObjectTypeMismatch` if that document is not a `T`.
    fn get_and_update_one<T: DatabaseObject>(
        &self,
        filter: &Document,
        update: &Document,
        sort: Option<Document>,
    ) -> Result<Option<T>>;

    /// Handles on every matching document of type `T`
    ///
    /// Documents of other object types are skipped.
    fn query<T: DatabaseObject>(&self, filter: &Document) -> Result<Vec<T>>;

    /// Number of matching documents
    fn count_matching(&self, filter: &Document) -> Result<u64>;
}

impl CollectionExt for CollectionPtr {
    fn get<T: DatabaseObject>(&self, id: Id) -> Result<T> {
        if !self.has(id)? {
            return Err(Error::IdNotFound);
        }
        Ok(T::from_parts(Some(id), Some(self.clone())))
    }

    fn has(&self, id: Id) -> Result<bool> {
        Ok(Collection::count(self.as_ref(), &id_filter(id))? > 0)
    }

    fn has_of_type<T: DatabaseObject>(&self, id: Id) -> Result<bool> {
        let mut filter = id_filter(id);
        filter.insert(OBJECT_TYPE_FIELD, T::OBJECT_TYPE);
        Ok(Collection::count(self.as_ref(), &filter)? > 0)
    }

    fn find_id(&self, filter: &Document) -> Result<Option<Id>> {
        let found = self.find_one(filter, FindOptions::projected(doc! { "_id": 1 }))?;
        Ok(found.as_ref().and_then(document_id))
    }

    fn get_one<T: DatabaseObject>(
        &self,
        filter: &Document,
        sort: Option<Document>,
    ) -> Result<Option<T>> {
        let options = FindOptions {
            projection: Some(header_projection()),
            sort,
            limit: None,
        };
        match self.find_one(filter, options)? {
            Some(doc) => self.typed(&doc).map(Some),
            None => Ok(None),
        }
    }

    fn get_and_update_one<T: DatabaseObject>(
        &self,
        filter: &Document,
        update: &Document,
        sort: Option<Document>,
    ) -> Result<Option<T>> {
        let options = FindOneAndUpdateOptions {
            projection: Some(header_projection()),
            sort,
            return_document: ReturnDocument::Before,
        };
        match self.find_one_and_update(filter, update, options)? {
            Some(doc) => self.typed(&doc).map(Some),
            None => Ok(None),
        }
    }

    fn query<T: DatabaseObject>(&self, filter: &Document) -> Result<Vec<T>> {
        let docs = self.find(filter, FindOptions::projected(header_projection()))?;
        Ok(docs
            .iter()
            .filter(|doc| doc.get_str(OBJECT_TYPE_FIELD).ok() == Some(T::OBJECT_TYPE))
            .filter_map(document_id)
            .map(|id| T::from_parts(Some(id), Some(self.clone())))
            .collect())
    }

    fn count_matching(&self, filter: &Document) -> Result<u64> {
        Collection::count(self.as_ref(), filter)
    }
}

trait Typed {
    fn typed<T: DatabaseObject>(&self, doc: &Document) -> Result<T>;
}

impl Typed for CollectionPtr {
    fn typed<T: DatabaseObject>(&self, doc: &Document) -> Result<T> {
        let found = doc.get_str(OBJECT_TYPE_FIELD).unwrap_or_default();
        if found != T::OBJECT_TYPE {
            return Err(Error::ObjectTypeMismatch {
                expected: T::OBJECT_TYPE.to_string(),
                found: found.to_string(),
            });
        }
        let id = document_id(doc).ok_or(Error::MissingIdOrField)?;
        Ok(T::from_parts(Some(id), Some(self.clone())))
    }
}

fn document_id(doc: &Document) -> Option<Id> {
    match doc.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => Some(Id::from(*oid)),
        _ => None,
    }
}
