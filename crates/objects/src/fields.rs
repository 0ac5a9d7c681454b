//! Generic field accessors
//!
//! Typed reads and writes of one named field of an entity's document. The
//! field may be a dotted path into nested documents.
//!
//! # Decoding
//!
//! [`FieldValue::from_bson`] returns `Ok(None)` when the wire type does not
//! match the requested type. Callers decide whether that is an error:
//! [`partial_get`] passes the `None` through, [`get`] turns it into
//! `Error::MissingIdOrField`. Two decodes fail hard instead:
//!
//! - a 64-bit wire integer read as `i32` that does not fit (`IntegerOverflow`)
//! - an array with an element of the wrong type (`ArrayElementDecode`)
//!
//! # Writes
//!
//! Every write is one `find_one_and_update` that applies the field change and
//! the `_lastmodified` touch together.

use std::collections::BTreeMap;

use bson::{doc, Bson, Document};
use tracing::{debug, warn};

use chemdb_core::{
    CalculationStatus, ElementaryStepType, Error, Id, Model, Result, StructureLabel,
};
use chemdb_storage::{
    get_path, has_path, including, FindOneAndUpdateOptions, FindOptions,
};

use crate::object::{id_filter, Object};

/// Codec between a Rust value and one wire value
pub trait FieldValue: Sized {
    /// Type name used in decode errors
    const TYPE_NAME: &'static str;

    /// Encode the value
    fn to_bson(&self) -> Bson;

    /// Decode a wire value; `Ok(None)` if the wire type does not match
    fn from_bson(value: &Bson) -> Result<Option<Self>>;
}

impl FieldValue for String {
    const TYPE_NAME: &'static str = "string";

    fn to_bson(&self) -> Bson {
        Bson::String(self.clone())
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::String(s) => Ok(Some(s.clone())),
            _ => Ok(None),
        }
    }
}

impl FieldValue for Id {
    const TYPE_NAME: &'static str = "id";

    fn to_bson(&self) -> Bson {
        Bson::from(*self)
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::ObjectId(oid) => Ok(Some(Id::from(*oid))),
            _ => Ok(None),
        }
    }
}

impl FieldValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn to_bson(&self) -> Bson {
        Bson::Double(*self)
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::Double(d) => Ok(Some(*d)),
            _ => Ok(None),
        }
    }
}

impl FieldValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_bson(&self) -> Bson {
        Bson::Boolean(*self)
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::Boolean(b) => Ok(Some(*b)),
            _ => Ok(None),
        }
    }
}

impl FieldValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn to_bson(&self) -> Bson {
        Bson::Int32(*self)
    }

    /// Also accepts 64-bit wire integers that fit
    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::Int32(v) => Ok(Some(*v)),
            Bson::Int64(v) => narrow_to_i32(*v).map(Some),
            _ => Ok(None),
        }
    }
}

impl FieldValue for Model {
    const TYPE_NAME: &'static str = "model";

    fn to_bson(&self) -> Bson {
        Bson::Document(self.to_document())
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::Document(doc) => Model::from_document(doc).map(Some),
            _ => Ok(None),
        }
    }
}

macro_rules! enum_field_value {
    ($ty:ty, $name:expr) => {
        impl FieldValue for $ty {
            const TYPE_NAME: &'static str = $name;

            fn to_bson(&self) -> Bson {
                Bson::String(self.as_str().to_string())
            }

            fn from_bson(value: &Bson) -> Result<Option<Self>> {
                match value {
                    Bson::String(s) => Ok(<$ty>::from_str_opt(s)),
                    _ => Ok(None),
                }
            }
        }
    };
}

enum_field_value!(CalculationStatus, "calculation_status");
enum_field_value!(ElementaryStepType, "elementary_step_type");
enum_field_value!(StructureLabel, "structure_label");

impl<T: FieldValue> FieldValue for Vec<T> {
    const TYPE_NAME: &'static str = "array";

    fn to_bson(&self) -> Bson {
        Bson::Array(self.iter().map(FieldValue::to_bson).collect())
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        let Bson::Array(elements) = value else {
            return Ok(None);
        };
        let mut decoded = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            match T::from_bson(element)? {
                Some(v) => decoded.push(v),
                None => {
                    return Err(Error::ArrayElementDecode {
                        index,
                        expected: T::TYPE_NAME,
                    })
                }
            }
        }
        Ok(Some(decoded))
    }
}

/// Keyed documents such as `auxiliaries` or `graphs`
///
/// An entry of the wrong type makes the whole map a soft failure.
impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    const TYPE_NAME: &'static str = "map";

    fn to_bson(&self) -> Bson {
        Bson::Document(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_bson()))
                .collect(),
        )
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        let Bson::Document(doc) = value else {
            return Ok(None);
        };
        let mut decoded = BTreeMap::new();
        for (key, entry) in doc {
            match T::from_bson(entry)? {
                Some(v) => {
                    decoded.insert(key.clone(), v);
                }
                None => return Ok(None),
            }
        }
        Ok(Some(decoded))
    }
}

/// Read any integral wire value
///
/// Doubles are accepted with a warning and truncated toward zero; legacy
/// documents stored some integer fields that way.
pub fn integer_from_bson(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int64(v) => Some(*v),
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Double(d) => {
            warn!(target: "chemdb::fields", value = *d, "double value stored for an integer field");
            Some(*d as i64)
        }
        _ => None,
    }
}

/// Narrow a wire integer to the 32-bit schema width
pub fn narrow_to_i32(value: i64) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::IntegerOverflow(value))
}

/// Write `field` and touch `_lastmodified`
pub fn set<T: FieldValue>(object: &Object, field: &str, value: &T) -> Result<()> {
    let mut assignment = Document::new();
    assignment.insert(field, value.to_bson());
    debug!(target: "chemdb::fields", field, "set");
    write(object, doc! { "$set": assignment })
}

/// Read `field`; `None` if the document or field is absent or mistyped
pub fn partial_get<T: FieldValue>(object: &Object, field: &str) -> Result<Option<T>> {
    let (collection, id) = object.target()?;
    debug!(target: "chemdb::fields", %id, field, "get");
    let Some(doc) =
        collection.find_one(&id_filter(id), FindOptions::projected(including([field])))?
    else {
        return Ok(None);
    };
    match get_path(&doc, field) {
        Some(value) => T::from_bson(value),
        None => Ok(None),
    }
}

/// Read `field`
///
/// # Errors
/// Returns `Error::MissingIdOrField` if the document or field is absent or
/// has an unexpected wire type.
pub fn get<T: FieldValue>(object: &Object, field: &str) -> Result<T> {
    partial_get(object, field)?.ok_or(Error::MissingIdOrField)
}

/// Remove `field` and touch `_lastmodified`
pub fn unset(object: &Object, field: &str) -> Result<()> {
    let mut removal = Document::new();
    removal.insert(field, "");
    debug!(target: "chemdb::fields", field, "unset");
    write(object, doc! { "$unset": removal })
}

/// Whether the key `field` is present, whatever its value
///
/// # Errors
/// Returns `Error::IdNotFound` if the document is absent.
pub fn exists(object: &Object, field: &str) -> Result<bool> {
    let (collection, id) = object.target()?;
    let doc = collection
        .find_one(&id_filter(id), FindOptions::projected(including([field])))?
        .ok_or(Error::IdNotFound)?;
    Ok(has_path(&doc, field))
}

/// Whether `field` is present and neither null nor the empty string
///
/// Evaluated by the store as a filter, not by inspecting the value here.
pub fn non_null(object: &Object, field: &str) -> Result<bool> {
    let (collection, id) = object.target()?;
    let mut condition = Document::new();
    condition.insert(field, doc! { "$exists": true, "$nin": ["", Bson::Null] });
    let filter = doc! { "$and": [ { "_id": id }, condition ] };
    Ok(collection.count(&filter)? > 0)
}

/// Apply one update operator to `field` and touch `_lastmodified`
pub(crate) fn modify(object: &Object, operator: &str, field: &str, value: Bson) -> Result<()> {
    let mut operand = Document::new();
    operand.insert(field, value);
    let mut update_doc = Document::new();
    update_doc.insert(operator, operand);
    debug!(target: "chemdb::fields", operator, field, "modify");
    write(object, update_doc)
}

/// Issue `update` together with the `_lastmodified` touch
pub(crate) fn write(object: &Object, mut update: Document) -> Result<()> {
    let (collection, id) = object.target()?;
    update.insert("$currentDate", doc! { "_lastmodified": true });
    collection.find_one_and_update(
        &id_filter(id),
        &update,
        FindOneAndUpdateOptions::projected(doc! { "_id": 1 }),
    )?;
    Ok(())
}
