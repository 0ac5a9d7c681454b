//! Manager configuration via `chemdb.toml`
//!
//! A missing file is not an error for callers that use
//! [`ManagerConfig::write_default_if_missing`] first: the default file is
//! written and then read back like any other.

use serde::{Deserialize, Serialize};
use std::path::Path;

use chemdb_core::{default_collection, Error, Result};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "chemdb.toml";

/// Characters a database name must not contain
const FORBIDDEN_NAME_CHARACTERS: &[char] = &['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];

/// Names of the default collections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CollectionNames {
    /// Structures
    pub structures: String,
    /// Calculations
    pub calculations: String,
    /// Elementary steps
    pub elementary_steps: String,
    /// Properties
    pub properties: String,
    /// Reactions
    pub reactions: String,
    /// Compounds
    pub compounds: String,
    /// Flasks
    pub flasks: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            structures: default_collection::STRUCTURE.to_string(),
            calculations: default_collection::CALCULATION.to_string(),
            elementary_steps: default_collection::ELEMENTARY_STEP.to_string(),
            properties: default_collection::PROPERTY.to_string(),
            reactions: default_collection::REACTION.to_string(),
            compounds: default_collection::COMPOUND.to_string(),
            flasks: default_collection::FLASK.to_string(),
        }
    }
}

impl CollectionNames {
    /// All names, in creation order
    pub fn all(&self) -> [&str; 7] {
        [
            self.structures.as_str(),
            self.calculations.as_str(),
            self.elementary_steps.as_str(),
            self.properties.as_str(),
            self.reactions.as_str(),
            self.compounds.as_str(),
            self.flasks.as_str(),
        ]
    }
}

/// Manager configuration loaded from `chemdb.toml`
///
/// # Example
///
/// ```toml
/// database_name = "default"
/// check_version = true
///
/// [collections]
/// structures = "structures"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Name of the database
    #[serde(default = "default_database_name")]
    pub database_name: String,
    /// Refuse to connect to a database written by another schema version
    #[serde(default = "default_check_version")]
    pub check_version: bool,
    /// Default collection names
    #[serde(default)]
    pub collections: CollectionNames,
}

fn default_database_name() -> String {
    "default".to_string()
}

fn default_check_version() -> bool {
    true
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            database_name: default_database_name(),
            check_version: default_check_version(),
            collections: CollectionNames::default(),
        }
    }
}

impl ManagerConfig {
    /// Config for a named database with all other settings at their defaults
    pub fn with_database_name(name: impl Into<String>) -> Self {
        Self {
            database_name: name.into(),
            ..Self::default()
        }
    }

    /// Check the database name
    ///
    /// # Errors
    /// Returns `Error::Config` if the name is empty or contains a forbidden character.
    pub fn validate(&self) -> Result<()> {
        if self.database_name.is_empty() {
            return Err(Error::Config("database name must not be empty".to_string()));
        }
        if let Some(c) = self
            .database_name
            .chars()
            .find(|c| FORBIDDEN_NAME_CHARACTERS.contains(c))
        {
            return Err(Error::Config(format!(
                "database name '{}' contains the forbidden character '{}'",
                self.database_name, c
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# chemdb configuration
#
# Name of the database
database_name = "default"

# Refuse to connect when the stored schema version differs from the
# wrapper version in major or minor number (default: true)
check_version = true

# Names of the default collections
[collections]
structures = "structures"
calculations = "calculations"
elementary_steps = "elementary_steps"
properties = "properties"
reactions = "reactions"
compounds = "compounds"
flasks = "flasks"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it cannot be parsed or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ManagerConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
