//! Generic settings values
//!
//! A [`GenericValue`] is a closed, recursively nested value type used for
//! calculation settings: scalars, typed lists, nested [`ValueCollection`]s and
//! [`ParametrizedOptionValue`]s. The document codec lives next to the field
//! accessors; this module only holds the model.

use crate::error::{Error, Result};

/// One settings value
#[derive(Debug, Clone, PartialEq)]
pub enum GenericValue {
    /// Boolean scalar
    Bool(bool),
    /// 32-bit integer scalar
    Int(i32),
    /// Floating point scalar
    Double(f64),
    /// String scalar
    String(String),
    /// List of integers
    IntList(Vec<i32>),
    /// List of doubles
    DoubleList(Vec<f64>),
    /// List of strings
    StringList(Vec<String>),
    /// Nested collection
    Collection(ValueCollection),
    /// Selected option with its own settings
    OptionWithSettings(ParametrizedOptionValue),
    /// List of nested collections
    CollectionList(Vec<ValueCollection>),
}

impl GenericValue {
    /// Short name of the variant, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            GenericValue::Bool(_) => "bool",
            GenericValue::Int(_) => "int",
            GenericValue::Double(_) => "double",
            GenericValue::String(_) => "string",
            GenericValue::IntList(_) => "int_list",
            GenericValue::DoubleList(_) => "double_list",
            GenericValue::StringList(_) => "string_list",
            GenericValue::Collection(_) => "collection",
            GenericValue::OptionWithSettings(_) => "option_with_settings",
            GenericValue::CollectionList(_) => "collection_list",
        }
    }

    /// Get as bool if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GenericValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32 if this is an Int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            GenericValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double
    pub fn as_double(&self) -> Option<f64> {
        match self {
            GenericValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as &str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GenericValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a nested collection if this is a Collection
    pub fn as_collection(&self) -> Option<&ValueCollection> {
        match self {
            GenericValue::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Get as an option value if this is an OptionWithSettings
    pub fn as_option(&self) -> Option<&ParametrizedOptionValue> {
        match self {
            GenericValue::OptionWithSettings(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for GenericValue {
    fn from(b: bool) -> Self {
        GenericValue::Bool(b)
    }
}

impl From<i32> for GenericValue {
    fn from(i: i32) -> Self {
        GenericValue::Int(i)
    }
}

impl From<f64> for GenericValue {
    fn from(d: f64) -> Self {
        GenericValue::Double(d)
    }
}

impl From<String> for GenericValue {
    fn from(s: String) -> Self {
        GenericValue::String(s)
    }
}

impl From<&str> for GenericValue {
    fn from(s: &str) -> Self {
        GenericValue::String(s.to_string())
    }
}

impl From<Vec<i32>> for GenericValue {
    fn from(v: Vec<i32>) -> Self {
        GenericValue::IntList(v)
    }
}

impl From<Vec<f64>> for GenericValue {
    fn from(v: Vec<f64>) -> Self {
        GenericValue::DoubleList(v)
    }
}

impl From<Vec<String>> for GenericValue {
    fn from(v: Vec<String>) -> Self {
        GenericValue::StringList(v)
    }
}

impl From<ValueCollection> for GenericValue {
    fn from(c: ValueCollection) -> Self {
        GenericValue::Collection(c)
    }
}

impl From<ParametrizedOptionValue> for GenericValue {
    fn from(o: ParametrizedOptionValue) -> Self {
        GenericValue::OptionWithSettings(o)
    }
}

impl From<Vec<ValueCollection>> for GenericValue {
    fn from(v: Vec<ValueCollection>) -> Self {
        GenericValue::CollectionList(v)
    }
}

/// A selected option together with the settings that belong to it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParametrizedOptionValue {
    /// Name of the selected option
    pub selected_option: String,
    /// Settings of the selected option
    pub option_settings: ValueCollection,
}

impl ParametrizedOptionValue {
    /// Create an option value
    pub fn new(selected_option: impl Into<String>, option_settings: ValueCollection) -> Self {
        Self {
            selected_option: selected_option.into(),
            option_settings,
        }
    }
}

/// Insertion-ordered map from unique string keys to [`GenericValue`]s
///
/// Entry order is preserved through the document codec, so two collections
/// built in the same order compare equal after a round trip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueCollection {
    entries: Vec<(String, GenericValue)>,
}

impl ValueCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if the key is already present.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<GenericValue>) -> Result<()> {
        let key = key.into();
        if self.contains(&key) {
            return Err(Error::InvalidArgument(format!(
                "key '{}' already exists in the collection",
                key
            )));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Replace the value for `key`, or append it if absent
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<GenericValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove and return the value for `key`
    pub fn remove(&mut self, key: &str) -> Option<GenericValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GenericValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<GenericValue>> FromIterator<(K, V)> for ValueCollection {
    /// Later duplicates replace earlier ones
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Self::new();
        for (k, v) in iter {
            collection.set(k, v);
        }
        collection
    }
}
