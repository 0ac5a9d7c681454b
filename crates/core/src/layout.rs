//! Database layout: enum string tables and collection names
//!
//! The string forms below are persisted in documents and shared with every
//! other client of the same database. They MUST NOT change.
//!
//! Each enum maps to its string with one exhaustive `match` in each direction,
//! so the tables are fixed at compile time and cannot drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalculationStatus {
    /// Still being set up, not yet ready to run
    Construction,
    /// Ready to be picked up
    New,
    /// Picked up by a worker
    Pending,
    /// Finished successfully
    Complete,
    /// Results have been analyzed
    Analyzed,
    /// Held back from execution
    Hold,
    /// Finished unsuccessfully
    Failed,
}

impl CalculationStatus {
    /// All statuses (for iteration)
    pub const ALL: [CalculationStatus; 7] = [
        CalculationStatus::Construction,
        CalculationStatus::New,
        CalculationStatus::Pending,
        CalculationStatus::Complete,
        CalculationStatus::Analyzed,
        CalculationStatus::Hold,
        CalculationStatus::Failed,
    ];

    /// Persisted string form
    pub const fn as_str(&self) -> &'static str {
        match self {
            CalculationStatus::Construction => "construction",
            CalculationStatus::New => "new",
            CalculationStatus::Pending => "pending",
            CalculationStatus::Complete => "complete",
            CalculationStatus::Analyzed => "analyzed",
            CalculationStatus::Hold => "hold",
            CalculationStatus::Failed => "failed",
        }
    }

    /// Parse the persisted string form
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "construction" => Some(CalculationStatus::Construction),
            "new" => Some(CalculationStatus::New),
            "pending" => Some(CalculationStatus::Pending),
            "complete" => Some(CalculationStatus::Complete),
            "analyzed" => Some(CalculationStatus::Analyzed),
            "hold" => Some(CalculationStatus::Hold),
            "failed" => Some(CalculationStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of elementary step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementaryStepType {
    /// Step through a transition state
    Regular,
    /// Step without a barrier
    Barrierless,
}

impl ElementaryStepType {
    /// All step types (for iteration)
    pub const ALL: [ElementaryStepType; 2] =
        [ElementaryStepType::Regular, ElementaryStepType::Barrierless];

    /// Persisted string form
    pub const fn as_str(&self) -> &'static str {
        match self {
            ElementaryStepType::Regular => "regular",
            ElementaryStepType::Barrierless => "barrierless",
        }
    }

    /// Parse the persisted string form
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(ElementaryStepType::Regular),
            "barrierless" => Some(ElementaryStepType::Barrierless),
            _ => None,
        }
    }
}

impl fmt::Display for ElementaryStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label describing how a structure was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureLabel {
    /// No label
    None,
    /// Guess supplied by a user
    UserGuess,
    /// Optimized structure supplied by a user
    UserOptimized,
    /// Guess for a minimum
    MinimumGuess,
    /// Optimized minimum
    MinimumOptimized,
    /// Transition state guess
    TsGuess,
    /// Optimized transition state
    TsOptimized,
    /// Elementary step end point guess
    ElementaryStepGuess,
    /// Optimized elementary step end point
    ElementaryStepOptimized,
    /// Reactive complex guess
    ReactiveComplexGuess,
    /// Scanned reactive complex
    ReactiveComplexScanned,
    /// Optimized reactive complex
    ReactiveComplexOptimized,
    /// Surface guess
    SurfaceGuess,
    /// Optimized surface
    SurfaceOptimized,
    /// Surface adsorption guess
    SurfaceAdsorptionGuess,
    /// Not relevant for any further processing
    Irrelevant,
    /// Duplicate of another structure
    Duplicate,
}

impl StructureLabel {
    /// All labels (for iteration)
    pub const ALL: [StructureLabel; 17] = [
        StructureLabel::None,
        StructureLabel::UserGuess,
        StructureLabel::UserOptimized,
        StructureLabel::MinimumGuess,
        StructureLabel::MinimumOptimized,
        StructureLabel::TsGuess,
        StructureLabel::TsOptimized,
        StructureLabel::ElementaryStepGuess,
        StructureLabel::ElementaryStepOptimized,
        StructureLabel::ReactiveComplexGuess,
        StructureLabel::ReactiveComplexScanned,
        StructureLabel::ReactiveComplexOptimized,
        StructureLabel::SurfaceGuess,
        StructureLabel::SurfaceOptimized,
        StructureLabel::SurfaceAdsorptionGuess,
        StructureLabel::Irrelevant,
        StructureLabel::Duplicate,
    ];

    /// Persisted string form
    pub const fn as_str(&self) -> &'static str {
        match self {
            StructureLabel::None => "none",
            StructureLabel::UserGuess => "user_guess",
            StructureLabel::UserOptimized => "user_optimized",
            StructureLabel::MinimumGuess => "minimum_guess",
            StructureLabel::MinimumOptimized => "minimum_optimized",
            StructureLabel::TsGuess => "ts_guess",
            StructureLabel::TsOptimized => "ts_optimized",
            StructureLabel::ElementaryStepGuess => "elementary_step_guess",
            StructureLabel::ElementaryStepOptimized => "elementary_step_optimized",
            StructureLabel::ReactiveComplexGuess => "reactive_complex_guess",
            StructureLabel::ReactiveComplexScanned => "reactive_complex_scanned",
            StructureLabel::ReactiveComplexOptimized => "reactive_complex_optimized",
            StructureLabel::SurfaceGuess => "surface_guess",
            StructureLabel::SurfaceOptimized => "surface_optimized",
            StructureLabel::SurfaceAdsorptionGuess => "surface_adsorption_guess",
            StructureLabel::Irrelevant => "irrelevant",
            StructureLabel::Duplicate => "duplicate",
        }
    }

    /// Parse the persisted string form
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "none" => Some(StructureLabel::None),
            "user_guess" => Some(StructureLabel::UserGuess),
            "user_optimized" => Some(StructureLabel::UserOptimized),
            "minimum_guess" => Some(StructureLabel::MinimumGuess),
            "minimum_optimized" => Some(StructureLabel::MinimumOptimized),
            "ts_guess" => Some(StructureLabel::TsGuess),
            "ts_optimized" => Some(StructureLabel::TsOptimized),
            "elementary_step_guess" => Some(StructureLabel::ElementaryStepGuess),
            "elementary_step_optimized" => Some(StructureLabel::ElementaryStepOptimized),
            "reactive_complex_guess" => Some(StructureLabel::ReactiveComplexGuess),
            "reactive_complex_scanned" => Some(StructureLabel::ReactiveComplexScanned),
            "reactive_complex_optimized" => Some(StructureLabel::ReactiveComplexOptimized),
            "surface_guess" => Some(StructureLabel::SurfaceGuess),
            "surface_optimized" => Some(StructureLabel::SurfaceOptimized),
            "surface_adsorption_guess" => Some(StructureLabel::SurfaceAdsorptionGuess),
            "irrelevant" => Some(StructureLabel::Irrelevant),
            "duplicate" => Some(StructureLabel::Duplicate),
            _ => None,
        }
    }
}

impl fmt::Display for StructureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Names of the default collections
pub mod default_collection {
    /// Structures
    pub const STRUCTURE: &str = "structures";
    /// Calculations
    pub const CALCULATION: &str = "calculations";
    /// Elementary steps
    pub const ELEMENTARY_STEP: &str = "elementary_steps";
    /// Properties
    pub const PROPERTY: &str = "properties";
    /// Reactions
    pub const REACTION: &str = "reactions";
    /// Compounds
    pub const COMPOUND: &str = "compounds";
    /// Flasks
    pub const FLASK: &str = "flasks";

    /// All default collections, in creation order
    pub const ALL: [&str; 7] = [
        STRUCTURE,
        CALCULATION,
        ELEMENTARY_STEP,
        PROPERTY,
        REACTION,
        COMPOUND,
        FLASK,
    ];
}

/// Names of internal collections
pub mod internal_collection {
    /// Database meta data (schema version, creation date)
    pub const META: &str = "_db_meta_data";
}
