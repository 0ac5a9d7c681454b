//! Calculation entity

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use bson::{doc, Bson, Document};

use chemdb_core::{
    CalculationStatus, Error, GenericValue, Id, Model, Result, ValueCollection,
};
use chemdb_storage::CollectionPtr;

use crate::fields::{self, integer_from_bson, narrow_to_i32, FieldValue};
use crate::object::{creation_header, database_object, id_filter, DatabaseObject};

const JOB: &str = "job";
const MODEL: &str = "model";
const STRUCTURES: &str = "structures";
const AUXILIARIES: &str = "auxiliaries";
const RESULTS: &str = "results";
const RESTART_INFORMATION: &str = "restart_information";
const SETTINGS: &str = "settings";
const STATUS: &str = "status";
const PRIORITY: &str = "priority";
const RAW_OUTPUT: &str = "raw_output";
const COMMENT: &str = "comment";
const EXECUTOR: &str = "executor";
const RUNTIME: &str = "runtime";

/// Priority given to new calculations; also the lowest priority
pub const DEFAULT_PRIORITY: i32 = 10;
const HIGHEST_PRIORITY: i32 = 1;

const JOB_TOLERANCE: f64 = 1e-12;

/// Resources and task of a calculation
#[derive(Debug, Clone)]
pub struct Job {
    /// Task to run (e.g. `scine_geometry_optimization`)
    pub order: String,
    /// Memory limit in GB
    pub memory: f64,
    /// Number of cores
    pub cores: i32,
    /// Disk limit in GB
    pub disk: f64,
}

impl Job {
    /// Job with one core, 1 GB memory and 1 GB disk
    pub fn new(order: impl Into<String>) -> Self {
        Self {
            order: order.into(),
            memory: 1.0,
            cores: 1,
            disk: 1.0,
        }
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.cores == other.cores
            && (self.memory - other.memory).abs() < JOB_TOLERANCE
            && (self.disk - other.disk).abs() < JOB_TOLERANCE
    }
}

impl FieldValue for Job {
    const TYPE_NAME: &'static str = "job";

    fn to_bson(&self) -> Bson {
        Bson::Document(doc! {
            "order": self.order.as_str(),
            "memory": self.memory,
            "cores": self.cores,
            "disk": self.disk,
        })
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        let Bson::Document(doc) = value else {
            return Ok(None);
        };
        let (Some(Bson::String(order)), Some(Bson::Double(memory)), Some(Bson::Double(disk))) =
            (doc.get("order"), doc.get("memory"), doc.get("disk"))
        else {
            return Ok(None);
        };
        let Some(cores) = doc.get("cores").and_then(integer_from_bson) else {
            return Ok(None);
        };
        Ok(Some(Job {
            order: order.clone(),
            memory: *memory,
            cores: narrow_to_i32(cores)?,
            disk: *disk,
        }))
    }
}

/// Entities generated by a calculation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results {
    /// Generated properties
    pub properties: Vec<Id>,
    /// Generated structures
    pub structures: Vec<Id>,
    /// Generated elementary steps
    pub elementary_steps: Vec<Id>,
}

impl Results {
    /// Whether nothing was generated
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.structures.is_empty() && self.elementary_steps.is_empty()
    }
}

/// Appends `other`, keeping the first occurrence of every id
impl AddAssign<&Results> for Results {
    fn add_assign(&mut self, other: &Results) {
        merge_unique(&mut self.properties, &other.properties);
        merge_unique(&mut self.structures, &other.structures);
        merge_unique(&mut self.elementary_steps, &other.elementary_steps);
    }
}

impl Add<&Results> for Results {
    type Output = Results;

    fn add(mut self, other: &Results) -> Results {
        self += other;
        self
    }
}

fn merge_unique(into: &mut Vec<Id>, other: &[Id]) {
    let mut merged: Vec<Id> = Vec::with_capacity(into.len() + other.len());
    for id in into.iter().chain(other) {
        if !merged.contains(id) {
            merged.push(*id);
        }
    }
    *into = merged;
}

impl FieldValue for Results {
    const TYPE_NAME: &'static str = "results";

    fn to_bson(&self) -> Bson {
        Bson::Document(doc! {
            "properties": self.properties.to_bson(),
            "structures": self.structures.to_bson(),
            "elementary_steps": self.elementary_steps.to_bson(),
        })
    }

    fn from_bson(value: &Bson) -> Result<Option<Self>> {
        let Bson::Document(doc) = value else {
            return Ok(None);
        };
        let (Some(properties), Some(structures), Some(elementary_steps)) = (
            id_list(doc, "properties")?,
            id_list(doc, "structures")?,
            id_list(doc, "elementary_steps")?,
        ) else {
            return Ok(None);
        };
        Ok(Some(Results {
            properties,
            structures,
            elementary_steps,
        }))
    }
}

fn id_list(doc: &Document, key: &str) -> Result<Option<Vec<Id>>> {
    match doc.get(key) {
        Some(value) => Vec::<Id>::from_bson(value),
        None => Ok(None),
    }
}

database_object!(
    /// A computational task on one or more structures
    Calculation,
    "calculation"
);

impl Calculation {
    /// Insert a new calculation in status `construction`
    pub fn create(
        model: &Model,
        job: &Job,
        structures: &[Id],
        collection: &CollectionPtr,
    ) -> Result<Self> {
        let mut doc = creation_header(Self::OBJECT_TYPE);
        doc.insert("analysis_disabled", false);
        doc.insert("exploration_disabled", false);
        doc.insert(JOB, job.to_bson());
        doc.insert(MODEL, model.to_document());
        doc.insert(STRUCTURES, structures.to_vec().to_bson());
        doc.insert(AUXILIARIES, doc! {});
        doc.insert(SETTINGS, doc! {});
        doc.insert(STATUS, CalculationStatus::Construction.as_str());
        doc.insert(PRIORITY, DEFAULT_PRIORITY);
        doc.insert(RESULTS, Results::default().to_bson());
        doc.insert(RAW_OUTPUT, "");
        doc.insert(COMMENT, "");
        doc.insert(EXECUTOR, "");
        doc.insert(RUNTIME, "");
        let id = collection.insert_one(doc)?;
        Ok(Self::new(id, collection.clone()))
    }

    /// Current status
    pub fn status(&self) -> Result<CalculationStatus> {
        fields::get(self, STATUS)
    }

    /// Change the status
    pub fn set_status(&self, status: CalculationStatus) -> Result<()> {
        fields::set(self, STATUS, &status)
    }

    /// Priority, 1 (highest) to 10 (lowest)
    pub fn priority(&self) -> Result<i32> {
        fields::get(self, PRIORITY)
    }

    /// Change the priority
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` outside `1..=10`.
    pub fn set_priority(&self, priority: i32) -> Result<()> {
        if !(HIGHEST_PRIORITY..=DEFAULT_PRIORITY).contains(&priority) {
            return Err(Error::InvalidArgument(format!(
                "priority has to be between {} and {}, got {}",
                HIGHEST_PRIORITY, DEFAULT_PRIORITY, priority
            )));
        }
        fields::set(self, PRIORITY, &priority)
    }

    /// Job description
    pub fn job(&self) -> Result<Job> {
        fields::get(self, JOB)
    }

    /// Replace the job description
    pub fn set_job(&self, job: &Job) -> Result<()> {
        fields::set(self, JOB, job)
    }

    /// Model of the calculation
    pub fn model(&self) -> Result<Model> {
        fields::get(self, MODEL)
    }

    /// Replace the model
    pub fn set_model(&self, model: &Model) -> Result<()> {
        fields::set(self, MODEL, model)
    }

    /// Input structures, in order
    pub fn structures(&self) -> Result<Vec<Id>> {
        fields::get(self, STRUCTURES)
    }

    /// Replace the input structures
    pub fn set_structures(&self, structures: &[Id]) -> Result<()> {
        fields::set(self, STRUCTURES, &structures.to_vec())
    }

    /// Append an input structure
    pub fn add_structure(&self, structure: Id) -> Result<()> {
        fields::modify(self, "$push", STRUCTURES, Bson::from(structure))
    }

    /// Remove every occurrence of an input structure
    pub fn remove_structure(&self, structure: Id) -> Result<()> {
        fields::modify(self, "$pull", STRUCTURES, Bson::from(structure))
    }

    /// Whether `structure` is an input structure
    pub fn has_structure(&self, structure: Id) -> Result<bool> {
        let (collection, id) = self.target()?;
        let mut filter = id_filter(id);
        filter.insert(STRUCTURES, structure);
        Ok(collection.count(&filter)? > 0)
    }

    /// Remove all input structures
    pub fn clear_structures(&self) -> Result<()> {
        self.set_structures(&[])
    }

    /// All settings
    pub fn settings(&self) -> Result<ValueCollection> {
        fields::get(self, SETTINGS)
    }

    /// Replace all settings
    pub fn set_settings(&self, settings: &ValueCollection) -> Result<()> {
        fields::set(self, SETTINGS, settings)
    }

    /// One setting
    pub fn setting(&self, key: &str) -> Result<GenericValue> {
        fields::get(self, &nested(SETTINGS, key))
    }

    /// Add or replace one setting
    pub fn set_setting(&self, key: &str, value: impl Into<GenericValue>) -> Result<()> {
        fields::set(self, &nested(SETTINGS, key), &value.into())
    }

    /// Whether a setting is present
    pub fn has_setting(&self, key: &str) -> Result<bool> {
        Ok(self.settings()?.contains(key))
    }

    /// Remove one setting
    pub fn remove_setting(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(SETTINGS, key))
    }

    /// Remove all settings
    pub fn clear_settings(&self) -> Result<()> {
        self.set_settings(&ValueCollection::new())
    }

    /// Generated entities
    pub fn results(&self) -> Result<Results> {
        fields::get(self, RESULTS)
    }

    /// Replace the generated entities
    pub fn set_results(&self, results: &Results) -> Result<()> {
        fields::set(self, RESULTS, results)
    }

    /// Reset the generated entities to three empty lists
    pub fn clear_results(&self) -> Result<()> {
        self.set_results(&Results::default())
    }

    /// All auxiliaries, by key
    pub fn auxiliaries(&self) -> Result<BTreeMap<String, Id>> {
        fields::get(self, AUXILIARIES)
    }

    /// One auxiliary
    pub fn auxiliary(&self, key: &str) -> Result<Id> {
        fields::get(self, &nested(AUXILIARIES, key))
    }

    /// Whether an auxiliary is stored under `key`
    pub fn has_auxiliary(&self, key: &str) -> Result<bool> {
        Ok(self.auxiliaries()?.contains_key(key))
    }

    /// Add or replace one auxiliary
    pub fn set_auxiliary(&self, key: &str, id: Id) -> Result<()> {
        fields::set(self, &nested(AUXILIARIES, key), &id)
    }

    /// Remove one auxiliary
    pub fn remove_auxiliary(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(AUXILIARIES, key))
    }

    /// Replace all auxiliaries
    pub fn set_auxiliaries(&self, auxiliaries: &BTreeMap<String, Id>) -> Result<()> {
        fields::set(self, AUXILIARIES, auxiliaries)
    }

    /// Remove all auxiliaries
    pub fn clear_auxiliaries(&self) -> Result<()> {
        self.set_auxiliaries(&BTreeMap::new())
    }

    /// Everything stored to ease a restart, by key
    ///
    /// Calculations are created without this field; it reads as empty until
    /// the first entry is set.
    ///
    /// # Errors
    /// Returns `Error::IdNotFound` if the document is absent.
    pub fn all_restart_information(&self) -> Result<BTreeMap<String, Id>> {
        if !fields::exists(self, RESTART_INFORMATION)? {
            return Ok(BTreeMap::new());
        }
        fields::get(self, RESTART_INFORMATION)
    }

    /// One restart entry
    pub fn restart_information(&self, key: &str) -> Result<Id> {
        fields::get(self, &nested(RESTART_INFORMATION, key))
    }

    /// Whether a restart entry is stored under `key`
    pub fn has_restart_information(&self, key: &str) -> Result<bool> {
        Ok(self.all_restart_information()?.contains_key(key))
    }

    /// Add or replace one restart entry
    pub fn set_restart_information(&self, key: &str, id: Id) -> Result<()> {
        fields::set(self, &nested(RESTART_INFORMATION, key), &id)
    }

    /// Remove one restart entry
    pub fn remove_restart_information(&self, key: &str) -> Result<()> {
        fields::unset(self, &nested(RESTART_INFORMATION, key))
    }

    /// Replace all restart entries
    pub fn set_all_restart_information(&self, entries: &BTreeMap<String, Id>) -> Result<()> {
        fields::set(self, RESTART_INFORMATION, entries)
    }

    /// Remove all restart entries
    pub fn clear_restart_information(&self) -> Result<()> {
        self.set_all_restart_information(&BTreeMap::new())
    }

    /// Raw program output
    pub fn raw_output(&self) -> Result<String> {
        fields::get(self, RAW_OUTPUT)
    }

    /// Store the raw program output
    pub fn set_raw_output(&self, output: &str) -> Result<()> {
        fields::set(self, RAW_OUTPUT, &output.to_string())
    }

    /// Whether raw output is stored
    pub fn has_raw_output(&self) -> Result<bool> {
        fields::non_null(self, RAW_OUTPUT)
    }

    /// Reset the raw output to the empty string
    pub fn clear_raw_output(&self) -> Result<()> {
        fields::set(self, RAW_OUTPUT, &String::new())
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

    /// Name of the worker that ran the calculation
    pub fn executor(&self) -> Result<String> {
        fields::get(self, EXECUTOR)
    }

    /// Record the worker
    pub fn set_executor(&self, executor: &str) -> Result<()> {
        fields::set(self, EXECUTOR, &executor.to_string())
    }

    /// Whether a worker is recorded
    pub fn has_executor(&self) -> Result<bool> {
        fields::non_null(self, EXECUTOR)
    }

    /// Reset the worker to the empty string
    pub fn clear_executor(&self) -> Result<()> {
        fields::set(self, EXECUTOR, &String::new())
    }

    /// Wall time in seconds
    pub fn runtime(&self) -> Result<f64> {
        fields::get(self, RUNTIME)
    }

    /// Record the wall time
    pub fn set_runtime(&self, runtime: f64) -> Result<()> {
        fields::set(self, RUNTIME, &runtime)
    }

    /// Whether a wall time is recorded
    pub fn has_runtime(&self) -> Result<bool> {
        fields::non_null(self, RUNTIME)
    }

    /// Reset the wall time to the empty string
    pub fn clear_runtime(&self) -> Result<()> {
        fields::set(self, RUNTIME, &String::new())
    }
}

fn nested(field: &str, key: &str) -> String {
    format!("{}.{}", field, key)
}
