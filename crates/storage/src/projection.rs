//! Projection of stored documents
//!
//! Inclusion projections (`{"a": 1, "b.c": 1}`) keep only the named paths;
//! exclusion projections (`{"a": 0}`) drop them. `_id` is included unless
//! explicitly excluded. Mixing inclusion and exclusion of non-`_id` fields
//! is rejected.

use bson::{Bson, Document};
use chemdb_core::{Error, Result};

use crate::filter::truthy;
use crate::path::{get_path, remove_path, set_path};

const ID_FIELD: &str = "_id";

/// Apply `projection` to `doc`
///
/// # Errors
/// Returns `Error::Storage` if the projection mixes inclusion and exclusion.
pub fn project(doc: &Document, projection: &Document) -> Result<Document> {
    if projection.is_empty() {
        return Ok(doc.clone());
    }
    let include_id = projection.get(ID_FIELD).map_or(true, truthy);
    let mut inclusions = Vec::new();
    let mut exclusions = Vec::new();
    for (path, flag) in projection {
        if path == ID_FIELD {
            continue;
        }
        if truthy(flag) {
            inclusions.push(path.as_str());
        } else {
            exclusions.push(path.as_str());
        }
    }
    if !inclusions.is_empty() && !exclusions.is_empty() {
        return Err(Error::Storage(
            "a projection cannot mix inclusion and exclusion".to_string(),
        ));
    }

    if inclusions.is_empty() {
        let mut out = doc.clone();
        for path in exclusions {
            remove_path(&mut out, path);
        }
        if !include_id {
            out.remove(ID_FIELD);
        }
        return Ok(out);
    }

    let mut out = Document::new();
    if include_id {
        if let Some(id) = doc.get(ID_FIELD) {
            out.insert(ID_FIELD, id.clone());
        }
    }
    for path in inclusions {
        if let Some(value) = get_path(doc, path) {
            set_path(&mut out, path, value.clone())?;
        }
    }
    Ok(out)
}

/// Projection document including each path
pub fn including<'a>(paths: impl IntoIterator<Item = &'a str>) -> Document {
    let mut projection = Document::new();
    for path in paths {
        projection.insert(path, Bson::Int32(1));
    }
    projection
}
