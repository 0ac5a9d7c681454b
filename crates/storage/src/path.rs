//! Dotted field paths inside documents
//!
//! A path such as `settings.optimizer.threshold` names a field nested in
//! sub-documents. On read, a numeric segment also indexes into an array.
//! On write, missing intermediate documents are created.

use bson::{Bson, Document};
use chemdb_core::{Error, Result};

/// Value at a dotted path
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(d) => d.get(segment)?,
            Bson::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable value at a dotted path (documents only)
pub fn get_path_mut<'a>(doc: &'a mut Document, path: &str) -> Option<&'a mut Bson> {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, path),
    };
    let target = match parent {
        Some(parent) => match get_path_mut(doc, parent)? {
            Bson::Document(d) => d,
            _ => return None,
        },
        None => doc,
    };
    target.get_mut(last)
}

/// Whether a field exists at the dotted path, regardless of its value
pub fn has_path(doc: &Document, path: &str) -> bool {
    get_path(doc, path).is_some()
}

/// Set the value at a dotted path, creating intermediate documents
///
/// # Errors
/// Returns `Error::Storage` if an intermediate segment exists and is not a document.
pub fn set_path(doc: &mut Document, path: &str, value: Bson) -> Result<()> {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
            Ok(())
        }
        Some((head, rest)) => {
            if !doc.contains_key(head) {
                doc.insert(head, Document::new());
            }
            match doc.get_mut(head) {
                Some(Bson::Document(child)) => set_path(child, rest, value),
                _ => Err(Error::Storage(format!(
                    "cannot create field '{}' in non-document element '{}'",
                    rest, head
                ))),
            }
        }
    }
}

/// Remove the value at a dotted path and return it
pub fn remove_path(doc: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head)? {
            Bson::Document(child) => remove_path(child, rest),
            _ => None,
        },
    }
}
