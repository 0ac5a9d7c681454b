//! Electronic structure model
//!
//! A [`Model`] names the level of theory a calculation or property was
//! obtained with. Every entry is a string; `"any"` matches every concrete
//! value and `"none"` (or the empty string) means the entry does not apply.

use bson::{Bson, Document};

use crate::error::{Error, Result};

const ANY: &str = "any";
const NONE: &str = "none";
const DOUBLE_TOLERANCE: f64 = 1e-12;

/// Level of theory description
#[derive(Debug, Clone)]
pub struct Model {
    /// Spin treatment (restricted, unrestricted, ...)
    pub spin_mode: String,
    /// Basis set
    pub basis_set: String,
    /// Method
    pub method: String,
    /// Method family (dft, gfn2, ...)
    pub method_family: String,
    /// Program
    pub program: String,
    /// Program version
    pub version: String,
    /// Temperature in K
    pub temperature: String,
    /// Electronic temperature in K
    pub electronic_temperature: String,
    /// Implicit solvation model
    pub solvation: String,
    /// Solvent
    pub solvent: String,
    /// Embedding scheme
    pub embedding: String,
    /// Periodic boundary conditions
    pub periodic_boundaries: String,
    /// External field
    pub external_field: String,
}

impl Model {
    /// Create a model with defaults for every entry but the three given ones
    pub fn new(
        method_family: impl Into<String>,
        method: impl Into<String>,
        basis_set: impl Into<String>,
    ) -> Self {
        Self {
            spin_mode: ANY.to_string(),
            basis_set: basis_set.into(),
            method: method.into(),
            method_family: method_family.into(),
            program: ANY.to_string(),
            version: ANY.to_string(),
            temperature: "298.15".to_string(),
            electronic_temperature: ANY.to_string(),
            solvation: NONE.to_string(),
            solvent: NONE.to_string(),
            embedding: NONE.to_string(),
            periodic_boundaries: NONE.to_string(),
            external_field: NONE.to_string(),
        }
    }

    /// Entries as `(key, value)` in persisted key order
    pub fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("basis_set", self.basis_set.as_str()),
            ("electronic_temperature", self.electronic_temperature.as_str()),
            ("embedding", self.embedding.as_str()),
            ("external_field", self.external_field.as_str()),
            ("method", self.method.as_str()),
            ("method_family", self.method_family.as_str()),
            ("periodic_boundaries", self.periodic_boundaries.as_str()),
            ("program", self.program.as_str()),
            ("solvation", self.solvation.as_str()),
            ("solvent", self.solvent.as_str()),
            ("spin_mode", self.spin_mode.as_str()),
            ("temperature", self.temperature.as_str()),
            ("version", self.version.as_str()),
        ]
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "basis_set" => Some(&mut self.basis_set),
            "electronic_temperature" => Some(&mut self.electronic_temperature),
            "embedding" => Some(&mut self.embedding),
            "external_field" => Some(&mut self.external_field),
            "method" => Some(&mut self.method),
            "method_family" => Some(&mut self.method_family),
            "periodic_boundaries" => Some(&mut self.periodic_boundaries),
            "program" => Some(&mut self.program),
            "solvation" => Some(&mut self.solvation),
            "solvent" => Some(&mut self.solvent),
            "spin_mode" => Some(&mut self.spin_mode),
            "temperature" => Some(&mut self.temperature),
            "version" => Some(&mut self.version),
            _ => None,
        }
    }

    /// Nested document with one string field per entry
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (key, value) in self.entries() {
            doc.insert(key, value);
        }
        doc
    }

    /// Read a model from its nested document
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` if an entry is absent or not a string.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut model = Model::new("", "", "");
        let keys: Vec<&'static str> = model.entries().iter().map(|(k, _)| *k).collect();
        for key in keys {
            let value = match doc.get(key) {
                Some(Bson::String(s)) => s.clone(),
                _ => return Err(Error::MissingIdOrField),
            };
            if let Some(slot) = model.entry_mut(key) {
                *slot = value;
            }
        }
        Ok(model)
    }

    /// Whether an entry means "not applicable"
    pub fn entry_is_none(entry: &str) -> bool {
        entry.is_empty() || entry.eq_ignore_ascii_case(NONE)
    }

    /// Whether an entry matches every concrete value
    pub fn entry_is_any(entry: &str) -> bool {
        entry.eq_ignore_ascii_case(ANY)
    }

    fn entries_match(key: &str, lhs: &str, rhs: &str) -> bool {
        if (Self::entry_is_any(lhs) && !Self::entry_is_none(rhs))
            || (Self::entry_is_any(rhs) && !Self::entry_is_none(lhs))
            || (Self::entry_is_none(lhs) && Self::entry_is_none(rhs))
        {
            return true;
        }
        if lhs.eq_ignore_ascii_case(rhs) {
            return true;
        }
        if key == "temperature" || key == "electronic_temperature" {
            return match (lhs.trim().parse::<f64>(), rhs.trim().parse::<f64>()) {
                (Ok(l), Ok(r)) => (l - r).abs() < DOUBLE_TOLERANCE,
                _ => false,
            };
        }
        false
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.entries()
            .iter()
            .zip(other.entries().iter())
            .all(|((key, lhs), (_, rhs))| Self::entries_match(key, lhs, rhs))
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::new(ANY, ANY, ANY)
    }
}
