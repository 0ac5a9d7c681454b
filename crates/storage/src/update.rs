//! Update document evaluation
//!
//! An update document contains only operators: `$set`, `$unset`,
//! `$currentDate`, `$push`, `$pull` and `$addToSet`. Operators are applied
//! in document order to a working copy; the caller swaps it in only when
//! every operator succeeded, so a failing update leaves the stored document
//! unchanged.

use bson::{Bson, DateTime, Document};
use chemdb_core::{Error, Result};

use crate::compare::values_equal;
use crate::path::{get_path_mut, remove_path, set_path};

const ID_FIELD: &str = "_id";

/// Apply `update` to `doc` and return the updated document
///
/// # Errors
/// Returns `Error::Storage` for unsupported operators, for attempts to
/// modify `_id`, and for array operators applied to non-array fields.
pub fn apply_update(doc: &Document, update: &Document) -> Result<Document> {
    if update.is_empty() {
        return Err(Error::Storage("update document must not be empty".to_string()));
    }
    let mut working = doc.clone();
    for (op, fields) in update {
        let fields = match fields {
            Bson::Document(d) => d,
            _ => {
                return Err(Error::Storage(format!(
                    "'{}' expects a document of fields",
                    op
                )))
            }
        };
        for (path, value) in fields {
            if path == ID_FIELD || path.starts_with("_id.") {
                return Err(Error::Storage("the '_id' field is immutable".to_string()));
            }
            match op.as_str() {
                "$set" => set_path(&mut working, path, value.clone())?,
                "$unset" => {
                    remove_path(&mut working, path);
                }
                "$currentDate" => {
                    check_current_date_spec(value)?;
                    set_path(&mut working, path, Bson::DateTime(DateTime::now()))?;
                }
                "$push" => {
                    let items = each_items(value);
                    let array = array_at(&mut working, path)?;
                    array.extend(items);
                }
                "$addToSet" => {
                    let items = each_items(value);
                    let array = array_at(&mut working, path)?;
                    for item in items {
                        if !array.iter().any(|existing| values_equal(existing, &item)) {
                            array.push(item);
                        }
                    }
                }
                "$pull" => {
                    if let Some(existing) = get_path_mut(&mut working, path) {
                        match existing {
                            Bson::Array(array) => {
                                array.retain(|item| !values_equal(item, value));
                            }
                            _ => {
                                return Err(Error::Storage(format!(
                                    "cannot apply '$pull' to non-array field '{}'",
                                    path
                                )))
                            }
                        }
                    }
                }
                other if other.starts_with('$') => {
                    return Err(Error::Storage(format!(
                        "unsupported update operator '{}'",
                        other
                    )))
                }
                _ => {
                    return Err(Error::Storage(
                        "update document must contain only operators".to_string(),
                    ))
                }
            }
        }
    }
    Ok(working)
}

fn check_current_date_spec(value: &Bson) -> Result<()> {
    match value {
        Bson::Boolean(true) => Ok(()),
        Bson::Document(d) if d.get_str("$type").map_or(false, |t| t == "date") => Ok(()),
        _ => Err(Error::Storage(
            "'$currentDate' expects true or {$type: \"date\"}".to_string(),
        )),
    }
}

fn each_items(value: &Bson) -> Vec<Bson> {
    match value {
        Bson::Document(d) => match d.get("$each") {
            Some(Bson::Array(items)) => items.clone(),
            _ => vec![value.clone()],
        },
        _ => vec![value.clone()],
    }
}

/// Array at `path`, created empty if the field is missing
fn array_at<'a>(doc: &'a mut Document, path: &str) -> Result<&'a mut Vec<Bson>> {
    if get_path_mut(doc, path).is_none() {
        set_path(doc, path, Bson::Array(Vec::new()))?;
    }
    match get_path_mut(doc, path) {
        Some(Bson::Array(array)) => Ok(array),
        _ => Err(Error::Storage(format!(
            "cannot apply an array operator to non-array field '{}'",
            path
        ))),
    }
}
