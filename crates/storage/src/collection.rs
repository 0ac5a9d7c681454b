//! The collection abstraction
//!
//! A [`Collection`] is a named bucket of documents keyed by `_id`. Entities
//! hold a shared [`CollectionPtr`] and issue every read and write through it;
//! nothing above this trait caches document content.
//!
//! # Atomicity
//!
//! [`Collection::find_one_and_update`] must select, modify and return one
//! document as a single step: no concurrent reader may observe part of an
//! update document applied. Field writes that also touch `_lastmodified`
//! rely on this.

use bson::Document;
use chemdb_core::{Id, Result};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a collection
pub type CollectionPtr = Arc<dyn Collection>;

/// Options for `find` and `find_one`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Fields to return; `None` returns whole documents
    pub projection: Option<Document>,
    /// Sort keys with `1` (ascending) or `-1` (descending)
    pub sort: Option<Document>,
    /// Maximum number of documents
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Options returning only the projected fields
    pub fn projected(projection: Document) -> Self {
        Self {
            projection: Some(projection),
            ..Self::default()
        }
    }

    /// Set the sort document
    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Which version of the document `find_one_and_update` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnDocument {
    /// The document as it was before the update
    #[default]
    Before,
    /// The document after the update
    After,
}

/// Options for `find_one_and_update`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneAndUpdateOptions {
    /// Fields to return; `None` returns the whole document
    pub projection: Option<Document>,
    /// Picks the first match in this order
    pub sort: Option<Document>,
    /// Version of the document to return
    pub return_document: ReturnDocument,
}

impl FindOneAndUpdateOptions {
    /// Options returning only the projected fields
    pub fn projected(projection: Document) -> Self {
        Self {
            projection: Some(projection),
            ..Self::default()
        }
    }

    /// Set the sort document
    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Return the updated document
    pub fn returning_after(mut self) -> Self {
        self.return_document = ReturnDocument::After;
        self
    }
}

/// A named bucket of documents
pub trait Collection: Send + Sync + fmt::Debug {
    /// Collection name
    fn name(&self) -> &str;

    /// Insert a document and return its `_id`
    ///
    /// A missing `_id` is assigned. Inserting an `_id` that already exists fails.
    fn insert_one(&self, doc: Document) -> Result<Id>;

    /// First document matching `filter`
    fn find_one(&self, filter: &Document, options: FindOptions) -> Result<Option<Document>>;

    /// All documents matching `filter`
    fn find(&self, filter: &Document, options: FindOptions) -> Result<Vec<Document>>;

    /// Atomically update the first document matching `filter`
    ///
    /// Returns `None` when nothing matches.
    fn find_one_and_update(
        &self,
        filter: &Document,
        update: &Document,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<Document>>;

    /// Apply `update` to every matching document; returns the number modified
    fn update_many(&self, filter: &Document, update: &Document) -> Result<u64>;

    /// Delete the first matching document; returns the number deleted
    fn delete_one(&self, filter: &Document) -> Result<u64>;

    /// Delete all matching documents; returns the number deleted
    fn delete_many(&self, filter: &Document) -> Result<u64>;

    /// Number of matching documents
    fn count(&self, filter: &Document) -> Result<u64>;
}
