//! Document codec for generic settings values
//!
//! Encoding:
//! - scalars map to their wire counterpart (`int` is written as Int32)
//! - typed lists become `{type: <tag>, list: [...]}` with the tag one of
//!   `int`, `double`, `str`, `value_coll`
//! - an option value becomes `{selectedOption, optionSettings}`
//! - a collection becomes a plain document, one key per entry
//!
//! Decoding a document checks for a `type` key first, then for
//! `selectedOption`, and only then falls back to a plain collection. A
//! document carrying both keys is therefore read as a typed list.

use bson::{Array, Bson, Document};

use chemdb_core::{Error, GenericValue, ParametrizedOptionValue, Result, ValueCollection};

use crate::fields::{integer_from_bson, narrow_to_i32, FieldValue};

const TYPE: &str = "type";
const LIST: &str = "list";
const SELECTED_OPTION: &str = "selectedOption";
const OPTION_SETTINGS: &str = "optionSettings";

const INT_TAG: &str = "int";
const DOUBLE_TAG: &str = "double";
const STRING_TAG: &str = "str";
const COLLECTION_TAG: &str = "value_coll";

/// Encode one value
pub fn serialize_value(value: &GenericValue) -> Bson {
    match value {
        GenericValue::Bool(b) => Bson::Boolean(*b),
        GenericValue::Int(i) => Bson::Int32(*i),
        GenericValue::Double(d) => Bson::Double(*d),
        GenericValue::String(s) => Bson::String(s.clone()),
        GenericValue::IntList(list) => {
            typed_list(INT_TAG, list.iter().map(|v| Bson::Int32(*v)).collect())
        }
        GenericValue::DoubleList(list) => {
            typed_list(DOUBLE_TAG, list.iter().map(|v| Bson::Double(*v)).collect())
        }
        GenericValue::StringList(list) => typed_list(
            STRING_TAG,
            list.iter().map(|v| Bson::String(v.clone())).collect(),
        ),
        GenericValue::CollectionList(list) => typed_list(
            COLLECTION_TAG,
            list.iter()
                .map(|c| Bson::Document(serialize_collection(c)))
                .collect(),
        ),
        GenericValue::OptionWithSettings(option) => {
            let mut doc = Document::new();
            doc.insert(SELECTED_OPTION, option.selected_option.as_str());
            doc.insert(OPTION_SETTINGS, serialize_collection(&option.option_settings));
            Bson::Document(doc)
        }
        GenericValue::Collection(collection) => Bson::Document(serialize_collection(collection)),
    }
}

/// Encode a collection as a plain document
pub fn serialize_collection(collection: &ValueCollection) -> Document {
    let mut doc = Document::new();
    for (key, value) in collection.iter() {
        doc.insert(key, serialize_value(value));
    }
    doc
}

fn typed_list(tag: &str, list: Array) -> Bson {
    let mut doc = Document::new();
    doc.insert(TYPE, tag);
    doc.insert(LIST, list);
    Bson::Document(doc)
}

/// Decode one value
///
/// # Errors
/// - `Error::UnrecognizedListType` for a list tag outside the known set
/// - `Error::UnrecognizedValueShape` for a wire value matching no shape
/// - `Error::ArrayElementDecode` for a list element of the wrong type
/// - `Error::IntegerOverflow` for a 64-bit integer outside the 32-bit range
pub fn deserialize_value(value: &Bson) -> Result<GenericValue> {
    match value {
        Bson::Boolean(b) => Ok(GenericValue::Bool(*b)),
        Bson::Int32(i) => Ok(GenericValue::Int(*i)),
        Bson::Int64(i) => narrow_to_i32(*i).map(GenericValue::Int),
        Bson::Double(d) => Ok(GenericValue::Double(*d)),
        Bson::String(s) => Ok(GenericValue::String(s.clone())),
        Bson::Document(doc) if doc.contains_key(TYPE) => deserialize_list(doc),
        Bson::Document(doc) if doc.contains_key(SELECTED_OPTION) => deserialize_option(doc),
        Bson::Document(doc) => deserialize_collection(doc).map(GenericValue::Collection),
        _ => Err(Error::UnrecognizedValueShape(
            "wire type cannot hold a settings value",
        )),
    }
}

/// Decode a plain document into a collection
pub fn deserialize_collection(doc: &Document) -> Result<ValueCollection> {
    let mut collection = ValueCollection::new();
    for (key, value) in doc {
        collection.set(key.as_str(), deserialize_value(value)?);
    }
    Ok(collection)
}

fn deserialize_list(doc: &Document) -> Result<GenericValue> {
    let tag = match doc.get(TYPE) {
        Some(Bson::String(tag)) => tag.as_str(),
        _ => return Err(Error::UnrecognizedValueShape("list type tag is not a string")),
    };
    let list = match doc.get(LIST) {
        Some(Bson::Array(list)) => list,
        _ => return Err(Error::UnrecognizedValueShape("typed list without a list array")),
    };
    match tag {
        INT_TAG => elements(list, INT_TAG, |v| match integer_from_bson(v) {
            Some(i) => narrow_to_i32(i).map(Some),
            None => Ok(None),
        })
        .map(GenericValue::IntList),
        DOUBLE_TAG => elements(list, DOUBLE_TAG, |v| Ok(v.as_f64()))
            .map(GenericValue::DoubleList),
        STRING_TAG => elements(list, STRING_TAG, |v| Ok(v.as_str().map(str::to_string)))
            .map(GenericValue::StringList),
        COLLECTION_TAG => elements(list, COLLECTION_TAG, |v| match v {
            Bson::Document(d) => deserialize_collection(d).map(Some),
            _ => Ok(None),
        })
        .map(GenericValue::CollectionList),
        other => Err(Error::UnrecognizedListType(other.to_string())),
    }
}

fn deserialize_option(doc: &Document) -> Result<GenericValue> {
    let selected = match doc.get(SELECTED_OPTION) {
        Some(Bson::String(s)) => s.clone(),
        _ => return Err(Error::UnrecognizedValueShape("selected option is not a string")),
    };
    let settings = match doc.get(OPTION_SETTINGS) {
        Some(Bson::Document(d)) => deserialize_collection(d)?,
        _ => {
            return Err(Error::UnrecognizedValueShape(
                "option value without option settings",
            ))
        }
    };
    Ok(GenericValue::OptionWithSettings(ParametrizedOptionValue::new(
        selected, settings,
    )))
}

fn elements<T>(
    list: &Array,
    expected: &'static str,
    decode: impl Fn(&Bson) -> Result<Option<T>>,
) -> Result<Vec<T>> {
    list.iter()
        .enumerate()
        .map(|(index, value)| decode(value)?.ok_or(Error::ArrayElementDecode { index, expected }))
        .collect()
}

impl FieldValue for GenericValue {
    const TYPE_NAME: &'static str = "generic_value";

    fn to_bson(&self) -> Bson {
        serialize_value(self)
    }

    /// Shape errors are hard failures
    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        deserialize_value(value).map(Some)
    }
}

impl FieldValue for ValueCollection {
    const TYPE_NAME: &'static str = "value_collection";

    fn to_bson(&self) -> Bson {
        Bson::Document(serialize_collection(self))
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        match value {
            Bson::Document(doc) => deserialize_collection(doc).map(Some),
            _ => Ok(None),
        }
    }
}
