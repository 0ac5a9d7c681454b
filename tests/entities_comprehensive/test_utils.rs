//! Test utilities for the entity tests

#![allow(dead_code)]

use std::sync::Once;

use chemdb::{
    default_collection, Calculation, CollectionPtr, Job, Manager, Model, Structure,
    StructureLabel,
};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Connected manager with the default collections
pub struct TestDatabase {
    pub manager: Manager,
    pub structures: CollectionPtr,
    pub calculations: CollectionPtr,
    pub elementary_steps: CollectionPtr,
    pub properties: CollectionPtr,
}

impl TestDatabase {
    pub fn new() -> Self {
        init_tracing();
        let manager = Manager::in_memory().expect("Failed to open database");
        let get = |name: &str| manager.get_collection(name).expect("Missing default collection");
        Self {
            structures: get(default_collection::STRUCTURE),
            calculations: get(default_collection::CALCULATION),
            elementary_steps: get(default_collection::ELEMENTARY_STEP),
            properties: get(default_collection::PROPERTY),
            manager,
        }
    }

    /// Neutral singlet guess structure
    pub fn structure(&self) -> Structure {
        Structure::create(&model(), StructureLabel::UserGuess, 0, 1, &self.structures)
            .expect("Failed to create structure")
    }

    /// Single point calculation on `structures`
    pub fn calculation(&self, structures: &[chemdb::Id]) -> Calculation {
        Calculation::create(&model(), &Job::new("single_point"), structures, &self.calculations)
            .expect("Failed to create calculation")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Model used by every test entity
pub fn model() -> Model {
    Model::new("dft", "pbe", "def2-svp")
}
