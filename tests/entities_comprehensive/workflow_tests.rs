//! Entities working together

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use bson::doc;
use chemdb::{
    Calculation, CalculationStatus, CollectionExt, ElementaryStep, ElementaryStepType, Id,
    NumberProperty, Results, Side, StructureLabel, VectorProperty,
};
use nalgebra::DVector;
use parking_lot::Mutex;

use crate::test_utils::{model, TestDatabase};

#[test]
fn single_point_results_are_linked_back() {
    let db = TestDatabase::new();
    let structure = db.structure();
    let calculation = db.calculation(&[structure.id().unwrap()]);
    calculation.set_status(CalculationStatus::Complete).unwrap();

    let energy = NumberProperty::create_with_references(
        "electronic_energy",
        &model(),
        &-76.4,
        structure.id().unwrap(),
        calculation.id().unwrap(),
        &db.properties,
    )
    .unwrap();
    let charges = VectorProperty::create_with_references(
        "atomic_charges",
        &model(),
        &DVector::from_vec(vec![-0.8, 0.4, 0.4]),
        structure.id().unwrap(),
        calculation.id().unwrap(),
        &db.properties,
    )
    .unwrap();
    structure.add_property("electronic_energy", energy.id().unwrap()).unwrap();
    structure.add_property("atomic_charges", charges.id().unwrap()).unwrap();

    let energy_id = structure.property("electronic_energy").unwrap();
    let fetched: NumberProperty = db.properties.get(energy_id).unwrap();
    assert_eq!(fetched.get_data().unwrap(), -76.4);
    assert_eq!(fetched.structure().unwrap(), structure.id().unwrap());
    assert_eq!(fetched.calculation().unwrap(), calculation.id().unwrap());

    let from_calculation: Vec<NumberProperty> = db
        .properties
        .query(&doc! {
            "calculation": calculation.id().unwrap(),
            "_propertytype": "number_property",
        })
        .unwrap();
    assert_eq!(from_calculation.len(), 1);

    let mut results = Results {
        properties: vec![energy.id().unwrap()],
        ..Results::default()
    };
    results += &Results {
        properties: vec![energy.id().unwrap(), charges.id().unwrap()],
        ..Results::default()
    };
    calculation.set_results(&results).unwrap();
    structure
        .add_calculation("single_point", calculation.id().unwrap())
        .unwrap();

    let linked = structure.calculation("single_point").unwrap();
    let linked: Calculation = db.calculations.get(linked).unwrap();
    let produced = linked.results().unwrap().properties;
    assert_eq!(produced, vec![energy.id().unwrap(), charges.id().unwrap()]);
    let charges_back: VectorProperty = db.properties.get(produced[1]).unwrap();
    assert_eq!(charges_back.get_data().unwrap().len(), 3);
}

#[test]
fn reaction_step_between_optimized_structures() {
    let db = TestDatabase::new();
    let reactant = db.structure();
    let product = db.structure();
    let ts = db.structure();
    reactant.set_label(StructureLabel::MinimumOptimized).unwrap();
    product.set_label(StructureLabel::MinimumOptimized).unwrap();
    ts.set_label(StructureLabel::TsOptimized).unwrap();

    let step = ElementaryStep::create(
        &[reactant.id().unwrap()],
        &[product.id().unwrap()],
        &db.elementary_steps,
    )
    .unwrap();
    step.set_transition_state(ts.id().unwrap()).unwrap();
    assert_eq!(step.has_reactant(product.id().unwrap()).unwrap(), Some(Side::Rhs));

    let with_ts: Vec<ElementaryStep> = db
        .elementary_steps
        .query(&doc! { "transition_state": ts.id().unwrap() })
        .unwrap();
    assert_eq!(with_ts.len(), 1);

    let barrierless: Vec<ElementaryStep> = db
        .elementary_steps
        .query(&doc! { "type": ElementaryStepType::Barrierless.as_str() })
        .unwrap();
    assert!(barrierless.is_empty());
}

#[test]
fn older_than_compares_timestamps() {
    let db = TestDatabase::new();
    let first = db.structure();
    thread::sleep(std::time::Duration::from_millis(5));
    let second = db.structure();
    assert!(first.older_than(&second, false).unwrap());
    assert!(!second.older_than(&first, false).unwrap());

    thread::sleep(std::time::Duration::from_millis(5));
    first.touch().unwrap();
    assert!(second.older_than(&first, true).unwrap());
}

#[test]
fn workers_claim_each_calculation_once() {
    const CALCULATIONS: usize = 40;
    const WORKERS: usize = 4;

    let db = TestDatabase::new();
    let mut ids = BTreeSet::new();
    for i in 0..CALCULATIONS {
        let calculation = db.calculation(&[]);
        calculation.set_status(CalculationStatus::New).unwrap();
        calculation.set_priority((i % 10) as i32 + 1).unwrap();
        ids.insert(calculation.id().unwrap());
    }

    let claimed: Arc<Mutex<Vec<Id>>> = Arc::new(Mutex::new(Vec::new()));
    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let calculations = db.calculations.clone();
            let claimed = Arc::clone(&claimed);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut update = doc! { "$set": { "status": "pending" } };
                update
                    .get_document_mut("$set")
                    .unwrap()
                    .insert("executor", format!("worker-{}", worker));
                while let Some(calculation) = calculations
                    .get_and_update_one::<Calculation>(
                        &doc! { "status": "new" },
                        &update,
                        Some(doc! { "priority": 1 }),
                    )
                    .unwrap()
                {
                    claimed.lock().push(calculation.id().unwrap());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let claimed = claimed.lock();
    assert_eq!(claimed.len(), CALCULATIONS);
    let unique: BTreeSet<Id> = claimed.iter().copied().collect();
    assert_eq!(unique, ids);
    assert_eq!(
        db.calculations.count_matching(&doc! { "status": "pending" }).unwrap(),
        CALCULATIONS as u64
    );
}
