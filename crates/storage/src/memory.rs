//! MemoryCollection: in-process collection backend
//!
//! Documents live in a `BTreeMap<Id, Document>` behind one
//! `parking_lot::RwLock`. Reads share the lock; every write, including the
//! whole of a `find_one_and_update`, runs under the write lock, so an update
//! document is applied as a single step.
//!
//! Iteration order without a sort is `_id` order, which for generated ids is
//! insertion order.

use std::collections::BTreeMap;

use bson::{Bson, Document};
use parking_lot::RwLock;
use tracing::{debug, trace};

use chemdb_core::{Error, Id, Result};

use crate::collection::{Collection, FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use crate::compare::sort_order;
use crate::filter::matches;
use crate::path::get_path;
use crate::projection::project;
use crate::update::apply_update;

const ID_FIELD: &str = "_id";

/// Thread-safe in-memory collection
#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    docs: RwLock<BTreeMap<Id, Document>>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Whether the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Ids of the documents matching `filter`, in result order
    fn matching_ids(
        docs: &BTreeMap<Id, Document>,
        filter: &Document,
        sort: Option<&Document>,
    ) -> Result<Vec<Id>> {
        let mut hits = Vec::new();
        for (id, doc) in docs {
            if matches(doc, filter)? {
                hits.push(*id);
            }
        }
        if let Some(sort) = sort {
            let keys = sort_keys(sort)?;
            hits.sort_by(|a, b| {
                let (da, db) = (&docs[a], &docs[b]);
                keys.iter()
                    .map(|(path, descending)| {
                        let ord = sort_order(get_path(da, path), get_path(db, path));
                        if *descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        Ok(hits)
    }
}

fn sort_keys(sort: &Document) -> Result<Vec<(String, bool)>> {
    sort.iter()
        .map(|(path, direction)| {
            let descending = match direction {
                Bson::Int32(1) | Bson::Int64(1) => false,
                Bson::Int32(-1) | Bson::Int64(-1) => true,
                Bson::Double(d) if *d == 1.0 => false,
                Bson::Double(d) if *d == -1.0 => true,
                other => {
                    return Err(Error::Storage(format!(
                        "invalid sort direction {} for '{}'",
                        other, path
                    )))
                }
            };
            Ok((path.clone(), descending))
        })
        .collect()
}

fn project_opt(doc: &Document, projection: Option<&Document>) -> Result<Document> {
    match projection {
        Some(p) => project(doc, p),
        None => Ok(doc.clone()),
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, doc: Document) -> Result<Id> {
        let id = match doc.get(ID_FIELD) {
            None => Id::new(),
            Some(Bson::ObjectId(oid)) => Id::from(*oid),
            Some(other) => {
                return Err(Error::Storage(format!(
                    "'_id' must be an object id, got {}",
                    other
                )))
            }
        };

        let mut stored = Document::new();
        stored.insert(ID_FIELD, id);
        for (key, value) in doc {
            if key != ID_FIELD {
                stored.insert(key, value);
            }
        }

        let mut docs = self.docs.write();
        if docs.contains_key(&id) {
            return Err(Error::Storage(format!(
                "duplicate key: '{}' already exists in '{}'",
                id, self.name
            )));
        }
        docs.insert(id, stored);
        trace!(target: "chemdb::storage", collection = %self.name, %id, "insert_one");
        Ok(id)
    }

    fn find_one(&self, filter: &Document, options: FindOptions) -> Result<Option<Document>> {
        let options = options.with_limit(1);
        Ok(self.find(filter, options)?.into_iter().next())
    }

    fn find(&self, filter: &Document, options: FindOptions) -> Result<Vec<Document>> {
        let docs = self.docs.read();
        let ids = Self::matching_ids(&docs, filter, options.sort.as_ref())?;
        let limit = options.limit.unwrap_or(usize::MAX);
        ids.iter()
            .take(limit)
            .map(|id| project_opt(&docs[id], options.projection.as_ref()))
            .collect()
    }

    fn find_one_and_update(
        &self,
        filter: &Document,
        update: &Document,
        options: FindOneAndUpdateOptions,
    ) -> Result<Option<Document>> {
        let mut docs = self.docs.write();
        let id = match Self::matching_ids(&docs, filter, options.sort.as_ref())?
            .into_iter()
            .next()
        {
            Some(id) => id,
            None => return Ok(None),
        };
        let before = match docs.get(&id) {
            Some(doc) => doc.clone(),
            None => return Ok(None),
        };
        let after = apply_update(&before, update)?;
        let returned = match options.return_document {
            ReturnDocument::Before => project_opt(&before, options.projection.as_ref())?,
            ReturnDocument::After => project_opt(&after, options.projection.as_ref())?,
        };
        docs.insert(id, after);
        debug!(target: "chemdb::storage", collection = %self.name, %id, "find_one_and_update");
        Ok(Some(returned))
    }

    fn update_many(&self, filter: &Document, update: &Document) -> Result<u64> {
        let mut docs = self.docs.write();
        let ids = Self::matching_ids(&docs, filter, None)?;
        let mut updated = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(doc) = docs.get(id) {
                updated.push((*id, apply_update(doc, update)?));
            }
        }
        let count = updated.len() as u64;
        for (id, doc) in updated {
            docs.insert(id, doc);
        }
        Ok(count)
    }

    fn delete_one(&self, filter: &Document) -> Result<u64> {
        let mut docs = self.docs.write();
        match Self::matching_ids(&docs, filter, None)?.first() {
            Some(id) => {
                docs.remove(id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, filter: &Document) -> Result<u64> {
        let mut docs = self.docs.write();
        let ids = Self::matching_ids(&docs, filter, None)?;
        for id in &ids {
            docs.remove(id);
        }
        Ok(ids.len() as u64)
    }

    fn count(&self, filter: &Document) -> Result<u64> {
        let docs = self.docs.read();
        let mut n = 0;
        for doc in docs.values() {
            if matches(doc, filter)? {
                n += 1;
            }
        }
        Ok(n)
    }
}
