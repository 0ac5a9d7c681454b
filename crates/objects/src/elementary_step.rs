//! Elementary step entity

use bson::{doc, Bson, Document};

use chemdb_core::{ElementaryStepType, Error, Id, Result};
use chemdb_storage::{CollectionPtr, FindOptions};

use crate::fields::{self, FieldValue};
use crate::object::{database_object, id_filter, DatabaseObject};

const LHS: &str = "lhs";
const RHS: &str = "rhs";
const TRANSITION_STATE: &str = "transition_state";
const TYPE: &str = "type";
const REACTION: &str = "reaction";
const PATH: &str = "path";

/// Side of an elementary step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left-hand side (reactants)
    Lhs,
    /// Right-hand side (products)
    Rhs,
    /// Both sides
    Both,
}

impl Side {
    fn fields(self) -> &'static [&'static str] {
        match self {
            Side::Lhs => &[LHS],
            Side::Rhs => &[RHS],
            Side::Both => &[LHS, RHS],
        }
    }
}

database_object!(
    /// One step connecting reactant and product structures
    ElementaryStep,
    "elementary_step"
);

impl ElementaryStep {
    /// Insert a new regular step
    pub fn create(lhs: &[Id], rhs: &[Id], collection: &CollectionPtr) -> Result<Self> {
        let now = bson::DateTime::now();
        let doc = doc! {
            "_created": now,
            "_lastmodified": now,
            "analysis_disabled": false,
            "exploration_disabled": false,
            "_objecttype": Self::OBJECT_TYPE,
            "lhs": lhs.to_vec().to_bson(),
            "rhs": rhs.to_vec().to_bson(),
            "transition_state": "",
            "type": ElementaryStepType::Regular.as_str(),
            "reaction": "",
            "path": [],
        };
        let id = collection.insert_one(doc)?;
        Ok(Self::new(id, collection.clone()))
    }

    /// Step type
    pub fn step_type(&self) -> Result<ElementaryStepType> {
        fields::get(self, TYPE)
    }

    /// Change the step type
    pub fn set_step_type(&self, step_type: ElementaryStepType) -> Result<()> {
        fields::set(self, TYPE, &step_type)
    }

    /// Reactants as `(lhs, rhs)`
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` if the document or a side is absent.
    pub fn reactants(&self) -> Result<(Vec<Id>, Vec<Id>)> {
        let (collection, id) = self.target()?;
        let doc = collection
            .find_one(&id_filter(id), FindOptions::projected(doc! { "lhs": 1, "rhs": 1 }))?
            .ok_or(Error::MissingIdOrField)?;
        Ok((side_ids(&doc, LHS)?, side_ids(&doc, RHS)?))
    }

    /// Which sides contain `structure`, if any
    pub fn has_reactant(&self, structure: Id) -> Result<Option<Side>> {
        let (lhs, rhs) = self.reactants()?;
        Ok(match (lhs.contains(&structure), rhs.contains(&structure)) {
            (true, true) => Some(Side::Both),
            (true, false) => Some(Side::Lhs),
            (false, true) => Some(Side::Rhs),
            (false, false) => None,
        })
    }

    /// Number of structures on each side
    pub fn count_reactants(&self) -> Result<(usize, usize)> {
        let (lhs, rhs) = self.reactants()?;
        Ok((lhs.len(), rhs.len()))
    }

    /// Append `structure` to `side`
    pub fn add_reactant(&self, structure: Id, side: Side) -> Result<()> {
        self.update_sides("$push", side, Bson::from(structure))
    }

    /// Remove every occurrence of `structure` from `side`
    pub fn remove_reactant(&self, structure: Id, side: Side) -> Result<()> {
        self.update_sides("$pull", side, Bson::from(structure))
    }

    /// Replace the structures on `side`
    pub fn set_reactants(&self, structures: &[Id], side: Side) -> Result<()> {
        self.update_sides("$set", side, structures.to_vec().to_bson())
    }

    /// Remove all structures from `side`
    pub fn clear_reactants(&self, side: Side) -> Result<()> {
        self.set_reactants(&[], side)
    }

    fn update_sides(&self, operator: &str, side: Side, value: Bson) -> Result<()> {
        let mut operand = Document::new();
        for field in side.fields() {
            operand.insert(*field, value.clone());
        }
        let mut update = Document::new();
        update.insert(operator, operand);
        fields::write(self, update)
    }

    /// Transition state structure
    pub fn transition_state(&self) -> Result<Id> {
        fields::get(self, TRANSITION_STATE)
    }

    /// Whether a transition state is assigned
    pub fn has_transition_state(&self) -> Result<bool> {
        fields::non_null(self, TRANSITION_STATE)
    }

    /// Assign the transition state
    pub fn set_transition_state(&self, structure: Id) -> Result<()> {
        fields::set(self, TRANSITION_STATE, &structure)
    }

    /// Drop the transition state
    pub fn clear_transition_state(&self) -> Result<()> {
        fields::set(self, TRANSITION_STATE, &String::new())
    }

    /// Reaction the step belongs to
    pub fn reaction(&self) -> Result<Id> {
        fields::get(self, REACTION)
    }

    /// Whether a reaction is assigned
    pub fn has_reaction(&self) -> Result<bool> {
        fields::non_null(self, REACTION)
    }

    /// Assign the reaction
    pub fn set_reaction(&self, reaction: Id) -> Result<()> {
        fields::set(self, REACTION, &reaction)
    }

    /// Drop the reaction
    pub fn clear_reaction(&self) -> Result<()> {
        fields::set(self, REACTION, &String::new())
    }

    /// Structures along the reaction path
    pub fn path(&self) -> Result<Vec<Id>> {
        fields::get(self, PATH)
    }

    /// Replace the reaction path
    pub fn set_path(&self, structures: &[Id]) -> Result<()> {
        fields::set(self, PATH, &structures.to_vec())
    }

    /// Whether `structure` lies on the reaction path
    pub fn has_structure_in_path(&self, structure: Id) -> Result<bool> {
        Ok(self.path()?.contains(&structure))
    }

    /// Empty the reaction path
    pub fn clear_path(&self) -> Result<()> {
        self.set_path(&[])
    }
}

fn side_ids(doc: &Document, side: &str) -> Result<Vec<Id>> {
    match doc.get(side) {
        Some(value) => Vec::<Id>::from_bson(value)?.ok_or(Error::MissingIdOrField),
        None => Err(Error::MissingIdOrField),
    }
}
