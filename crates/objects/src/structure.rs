//! Structure entity
//!
//! Geometry payloads are not stored; a structure carries its electronic
//! state (charge, multiplicity), a label, graph representations and the
//! bookkeeping for duplicate detection.
//!
//! Properties and calculations are referenced by key (`properties.<key>`,
//! `calculations.<key>`), each key holding a list of ids.

use std::collections::BTreeMap;

use bson::{doc, Bson};

use chemdb_core::{Error, Id, Model, Result, StructureLabel};
use chemdb_storage::CollectionPtr;

use crate::calculation::Calculation;
use crate::fields::{self, FieldValue};
use crate::object::{creation_header, database_object, DatabaseObject};

const MODEL: &str = "model";
const CHARGE: &str = "charge";
const MULTIPLICITY: &str = "multiplicity";
const LABEL: &str = "label";
const PROPERTIES: &str = "properties";
const COMMENT: &str = "comment";
const AGGREGATE: &str = "aggregate";
const DUPLICATE_OF: &str = "duplicate_of";
const CALCULATIONS: &str = "calculations";
const GRAPHS: &str = "graphs";

database_object!(
    /// A molecular structure
    Structure,
    "structure"
);

impl Structure {
    /// Insert a new structure
    pub fn create(
        model: &Model,
        label: StructureLabel,
        charge: i32,
        multiplicity: i32,
        collection: &CollectionPtr,
    ) -> Result<Self> {
        let mut doc = creation_header(Self::OBJECT_TYPE);
        doc.insert("analysis_disabled", false);
        doc.insert("exploration_disabled", false);
        doc.insert(MODEL, model.to_document());
        doc.insert(CHARGE, charge);
        doc.insert(MULTIPLICITY, multiplicity);
        doc.insert(LABEL, label.as_str());
        doc.insert(PROPERTIES, doc! {});
        doc.insert(CALCULATIONS, doc! {});
        doc.insert(COMMENT, "");
        doc.insert(AGGREGATE, "");
        doc.insert(DUPLICATE_OF, "");
        doc.insert(GRAPHS, doc! {});
        let id = collection.insert_one(doc)?;
        Ok(Self::new(id, collection.clone()))
    }

    /// Label
    pub fn label(&self) -> Result<StructureLabel> {
        fields::get(self, LABEL)
    }

    /// Change the label
    pub fn set_label(&self, label: StructureLabel) -> Result<()> {
        fields::set(self, LABEL, &label)
    }

    /// Molecular charge
    pub fn charge(&self) -> Result<i32> {
        fields::get(self, CHARGE)
    }

    /// Change the charge
    pub fn set_charge(&self, charge: i32) -> Result<()> {
        fields::set(self, CHARGE, &charge)
    }

    /// Spin multiplicity
    pub fn multiplicity(&self) -> Result<i32> {
        fields::get(self, MULTIPLICITY)
    }

    /// Change the spin multiplicity
    pub fn set_multiplicity(&self, multiplicity: i32) -> Result<()> {
        fields::set(self, MULTIPLICITY, &multiplicity)
    }

    /// Model the structure was obtained with
    pub fn model(&self) -> Result<Model> {
        fields::get(self, MODEL)
    }

    /// Replace the model
    pub fn set_model(&self, model: &Model) -> Result<()> {
        fields::set(self, MODEL, model)
    }

    /// Free-form comment
    pub fn comment(&self) -> Result<String> {
        fields::get(self, COMMENT)
    }

    /// Replace the comment
    pub fn set_comment(&self, comment: &str) -> Result<()> {
        fields::set(self, COMMENT, &comment.to_string())
    }

    /// Whether a non-empty comment is stored
    pub fn has_comment(&self) -> Result<bool> {
        fields::non_null(self, COMMENT)
    }

    /// Reset the comment to the empty string
    pub fn clear_comment(&self) -> Result<()> {
        fields::set(self, COMMENT, &String::new())
    }

    /// Aggregate the structure belongs to
    pub fn aggregate(&self) -> Result<Id> {
        fields::get(self, AGGREGATE)
    }

    /// Whether an aggregate is assigned
    pub fn has_aggregate(&self) -> Result<bool> {
        fields::non_null(self, AGGREGATE)
    }

    /// Assign an aggregate
    pub fn set_aggregate(&self, aggregate: Id) -> Result<()> {
        fields::set(self, AGGREGATE, &aggregate)
    }

    /// Drop the aggregate assignment
    pub fn clear_aggregate(&self) -> Result<()> {
        fields::set(self, AGGREGATE, &String::new())
    }

    /// Whether an original is assigned, i.e. this structure is a duplicate
    pub fn has_original(&self) -> Result<bool> {
        fields::non_null(self, DUPLICATE_OF)
    }

    /// Structure this one duplicates
    pub fn original(&self) -> Result<Id> {
        fields::get(self, DUPLICATE_OF)
    }

    /// Mark the structure as a duplicate of `original`
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if `original` is this structure.
    pub fn set_original(&self, original: Id) -> Result<()> {
        if self.id()? == original {
            return Err(Error::InvalidArgument(
                "a structure cannot be a duplicate of itself".to_string(),
            ));
        }
        fields::set(self, DUPLICATE_OF, &original)
    }

    /// Clear the duplicate mark
    pub fn clear_original(&self) -> Result<()> {
        fields::set(self, DUPLICATE_OF, &String::new())
    }

    /// All property references, by property name
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` if the document or its `properties`
    /// field is absent.
    pub fn all_properties(&self) -> Result<BTreeMap<String, Vec<Id>>> {
        fields::get(self, PROPERTIES)
    }

    /// Property references stored under `key`; empty if there are none
    pub fn properties(&self, key: &str) -> Result<Vec<Id>> {
        self.references(PROPERTIES, key)
    }

    /// The single property stored under `key`
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` unless exactly one is stored.
    pub fn property(&self, key: &str) -> Result<Id> {
        single(self.properties(key)?)
    }

    /// Whether any property is stored under `key`
    pub fn has_property(&self, key: &str) -> Result<bool> {
        Ok(self.all_properties()?.contains_key(key))
    }

    /// Whether `property` is referenced under any key
    pub fn has_property_id(&self, property: Id) -> Result<bool> {
        Ok(contains_reference(&self.all_properties()?, property))
    }

    /// Number of properties stored under `key`
    pub fn count_properties(&self, key: &str) -> Result<usize> {
        Ok(self.properties(key)?.len())
    }

    /// Append a property reference under `key`
    pub fn add_property(&self, key: &str, property: Id) -> Result<()> {
        fields::modify(self, "$push", &nested(PROPERTIES, key), Bson::from(property))
    }

    /// Append several property references under `key`
    pub fn add_properties(&self, key: &str, properties: &[Id]) -> Result<()> {
        fields::modify(self, "$push", &nested(PROPERTIES, key), each(properties))
    }

    /// Remove a property reference from `key`
    pub fn remove_property(&self, key: &str, property: Id) -> Result<()> {
        fields::modify(self, "$pull", &nested(PROPERTIES, key), Bson::from(property))
    }

    /// Replace the references under `key` with a single one
    pub fn set_property(&self, key: &str, property: Id) -> Result<()> {
        self.set_properties(key, &[property])
    }

    /// Replace the references under `key`
    pub fn set_properties(&self, key: &str, properties: &[Id]) -> Result<()> {
        fields::set(self, &nested(PROPERTIES, key), &properties.to_vec())
    }

    /// Remove `key` and its references
    pub fn clear_properties(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(PROPERTIES, key))
    }

    /// Replace every property reference
    pub fn set_all_properties(&self, properties: &BTreeMap<String, Vec<Id>>) -> Result<()> {
        fields::set(self, PROPERTIES, properties)
    }

    /// Remove every property reference
    pub fn clear_all_properties(&self) -> Result<()> {
        self.set_all_properties(&BTreeMap::new())
    }

    /// All calculation references, by job order
    pub fn all_calculations(&self) -> Result<BTreeMap<String, Vec<Id>>> {
        fields::get(self, CALCULATIONS)
    }

    /// Calculations stored under `key`; empty if there are none
    pub fn calculations(&self, key: &str) -> Result<Vec<Id>> {
        self.references(CALCULATIONS, key)
    }

    /// Calculations under `key` whose model matches `model`
    ///
    /// Fields of `model` set to `any` match every value. References missing
    /// from `collection` are skipped.
    pub fn query_calculations(
        &self,
        key: &str,
        model: &Model,
        collection: &CollectionPtr,
    ) -> Result<Vec<Id>> {
        let mut matching = Vec::new();
        for id in self.calculations(key)? {
            let calculation = Calculation::new(id, collection.clone());
            match calculation.model() {
                Ok(found) if found == *model => matching.push(id),
                Ok(_) | Err(Error::MissingIdOrField) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(matching)
    }

    /// The single calculation stored under `key`
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` unless exactly one is stored.
    pub fn calculation(&self, key: &str) -> Result<Id> {
        single(self.calculations(key)?)
    }

    /// Whether any calculation is stored under `key`
    pub fn has_calculation(&self, key: &str) -> Result<bool> {
        Ok(self.all_calculations()?.contains_key(key))
    }

    /// Whether `calculation` is referenced under any key
    pub fn has_calculation_id(&self, calculation: Id) -> Result<bool> {
        Ok(contains_reference(&self.all_calculations()?, calculation))
    }

    /// Number of calculations stored under `key`
    pub fn count_calculations(&self, key: &str) -> Result<usize> {
        Ok(self.calculations(key)?.len())
    }

    /// Append a calculation reference under `key`
    pub fn add_calculation(&self, key: &str, calculation: Id) -> Result<()> {
        fields::modify(self, "$push", &nested(CALCULATIONS, key), Bson::from(calculation))
    }

    /// Append several calculation references under `key`
    pub fn add_calculations(&self, key: &str, calculations: &[Id]) -> Result<()> {
        fields::modify(self, "$push", &nested(CALCULATIONS, key), each(calculations))
    }

    /// Remove a calculation reference from `key`
    pub fn remove_calculation(&self, key: &str, calculation: Id) -> Result<()> {
        fields::modify(self, "$pull", &nested(CALCULATIONS, key), Bson::from(calculation))
    }

    /// Replace the references under `key` with a single one
    pub fn set_calculation(&self, key: &str, calculation: Id) -> Result<()> {
        self.set_calculations(key, &[calculation])
    }

    /// Replace the references under `key`
    pub fn set_calculations(&self, key: &str, calculations: &[Id]) -> Result<()> {
        fields::set(self, &nested(CALCULATIONS, key), &calculations.to_vec())
    }

    /// Remove `key` and its references
    pub fn clear_calculations(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(CALCULATIONS, key))
    }

    /// Replace every calculation reference
    pub fn set_all_calculations(&self, calculations: &BTreeMap<String, Vec<Id>>) -> Result<()> {
        fields::set(self, CALCULATIONS, calculations)
    }

    /// Remove every calculation reference
    pub fn clear_all_calculations(&self) -> Result<()> {
        self.set_all_calculations(&BTreeMap::new())
    }

    /// All graph representations, by kind (e.g. `masm_cbor_graph`)
    pub fn graphs(&self) -> Result<BTreeMap<String, String>> {
        fields::get(self, GRAPHS)
    }

    /// One graph representation
    pub fn graph(&self, key: &str) -> Result<String> {
        fields::get(self, &nested(GRAPHS, key))
    }

    /// Whether a graph representation of kind `key` is stored
    pub fn has_graph(&self, key: &str) -> Result<bool> {
        Ok(self.graphs()?.contains_key(key))
    }

    /// Number of stored graph representations
    pub fn count_graphs(&self) -> Result<usize> {
        Ok(self.graphs()?.len())
    }

    /// Add or replace one graph representation
    pub fn set_graph(&self, key: &str, graph: &str) -> Result<()> {
        fields::set(self, &nested(GRAPHS, key), &graph.to_string())
    }

    /// Remove one graph representation
    pub fn remove_graph(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(GRAPHS, key))
    }

    /// Replace all graph representations
    pub fn set_graphs(&self, graphs: &BTreeMap<String, String>) -> Result<()> {
        fields::set(self, GRAPHS, graphs)
    }

    /// Remove all graph representations
    pub fn clear_graphs(&self) -> Result<()> {
        self.set_graphs(&BTreeMap::new())
    }

    fn references(&self, field: &str, key: &str) -> Result<Vec<Id>> {
        let all: BTreeMap<String, Vec<Id>> = fields::get(self, field)?;
        Ok(all.get(key).cloned().unwrap_or_default())
    }
}

fn nested(field: &str, key: &str) -> String {
    format!("{}.{}", field, key)
}

fn each(ids: &[Id]) -> Bson {
    Bson::Document(doc! { "$each": ids.to_vec().to_bson() })
}

fn single(ids: Vec<Id>) -> Result<Id> {
    match ids.as_slice() {
        [id] => Ok(*id),
        _ => Err(Error::MissingIdOrField),
    }
}

fn contains_reference(map: &BTreeMap<String, Vec<Id>>, id: Id) -> bool {
    map.values().any(|ids| ids.contains(&id))
}
