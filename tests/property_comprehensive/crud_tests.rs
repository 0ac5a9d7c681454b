//! create / get_data / set_data for every typed property

use chemdb::derived_property;
use chemdb::{
    BoolProperty, CollectionExt, DenseMatrixProperty, DerivedProperty, Error, Id,
    NumberProperty, Object, Property, SparseMatrixProperty, StringProperty, VectorProperty,
};
use nalgebra::{DMatrix, DVector};

use crate::test_utils::{dense, model, properties, sparse};

#[test]
fn document_layout_in_persisted_order() {
    let collection = properties();
    let structure = Id::new();
    let calculation = Id::new();
    let property = VectorProperty::create_with_references(
        "atomic_charges",
        &model(),
        &DVector::from_vec(vec![0.4, -0.8, 0.4]),
        structure,
        calculation,
        &collection,
    )
    .unwrap();
    let doc = property.raw_content().unwrap();
    let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        [
            "_id",
            "_created",
            "_lastmodified",
            "analysis_disabled",
            "exploration_disabled",
            "_objecttype",
            "_propertytype",
            "model",
            "property_name",
            "size",
            "data",
            "comment",
            "structure",
            "calculation",
        ]
    );
    assert_eq!(doc.get_str("_objecttype").unwrap(), "property");
    assert_eq!(doc.get_str("_propertytype").unwrap(), "vector_property");
    assert_eq!(doc.get_str("comment").unwrap(), "");
    assert!(!doc.get_bool("analysis_disabled").unwrap());
    assert_eq!(property.structure().unwrap(), structure);
    assert_eq!(property.calculation().unwrap(), calculation);
}

#[test]
fn references_absent_unless_given() {
    let collection = properties();
    let property = BoolProperty::create("converged", &model(), &true, &collection).unwrap();
    let doc = property.raw_content().unwrap();
    assert!(!doc.contains_key("structure"));
    assert!(!doc.contains_key("calculation"));
    assert!(!property.has_structure().unwrap());
    assert_eq!(property.partial_structure().unwrap(), None);
}

#[test]
fn every_type_round_trips_through_the_store() {
    let collection = properties();
    let m = model();

    let flag = BoolProperty::create("converged", &m, &false, &collection).unwrap();
    assert!(!flag.get_data().unwrap());

    let energy = NumberProperty::create("electronic_energy", &m, &-76.026_765, &collection).unwrap();
    assert_eq!(energy.get_data().unwrap(), -76.026_765);

    let text = StringProperty::create("point_group", &m, &"C2v".to_string(), &collection).unwrap();
    assert_eq!(text.get_data().unwrap(), "C2v");

    let vector = DVector::from_vec(vec![1.0, 2.0, 3.0]);
    let charges = VectorProperty::create("atomic_charges", &m, &vector, &collection).unwrap();
    assert_eq!(charges.get_data().unwrap(), vector);

    let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let gradients = DenseMatrixProperty::create("gradients", &m, &matrix, &collection).unwrap();
    assert_eq!(gradients.get_data().unwrap(), matrix);

    let orders = sparse(3, 3, &[(0, 1, 0.9), (1, 0, 0.9), (2, 2, 1.2)]);
    let bonds = SparseMatrixProperty::create("bond_orders", &m, &orders, &collection).unwrap();
    assert_eq!(dense(&bonds.get_data().unwrap()), dense(&orders));

    assert_eq!(collection.count_matching(&bson::doc! {}).unwrap(), 6);
}

#[test]
fn set_data_replaces_only_the_payload() {
    let collection = properties();
    let property = VectorProperty::create(
        "atomic_charges",
        &model(),
        &DVector::from_vec(vec![1.0, 2.0]),
        &collection,
    )
    .unwrap();
    property.set_comment("first guess").unwrap();
    property.set_data(&DVector::from_vec(vec![3.0, 4.0, 5.0])).unwrap();

    assert_eq!(property.get_data().unwrap(), DVector::from_vec(vec![3.0, 4.0, 5.0]));
    let doc = property.raw_content().unwrap();
    assert_eq!(doc.get_i64("size").unwrap(), 3);
    assert_eq!(doc.get_str("comment").unwrap(), "first guess");
    assert_eq!(doc.get_str("property_name").unwrap(), "atomic_charges");
}

#[test]
fn set_data_touches_last_modified() {
    let collection = properties();
    let property = NumberProperty::create("energy", &model(), &1.0, &collection).unwrap();
    let before = property.last_modified().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    property.set_data(&2.0).unwrap();
    assert!(property.last_modified().unwrap() > before);
    assert_eq!(property.created().unwrap(), before);
}

#[test]
fn create_without_collection() {
    let result = derived_property::create::<NumberProperty>(None, &model(), "energy", &1.0, None, None);
    assert!(matches!(result, Err(Error::MissingCollection)));
}

#[test]
fn unlinked_handles() {
    let property = NumberProperty::default();
    assert!(matches!(property.get_data(), Err(Error::MissingLinkedCollection)));
    assert!(matches!(property.set_data(&1.0), Err(Error::MissingLinkedCollection)));
}

#[test]
fn get_data_on_missing_document() {
    let property = NumberProperty::new(Id::new(), properties());
    assert!(matches!(property.get_data(), Err(Error::MissingIdOrField)));
}

#[test]
fn get_data_of_the_wrong_payload_type() {
    let collection = properties();
    let text = StringProperty::create("label", &model(), &"x".to_string(), &collection).unwrap();
    let misread = NumberProperty::new(text.id().unwrap(), collection);
    assert!(matches!(misread.get_data(), Err(Error::MissingIdOrField)));
}

#[test]
fn discriminators() {
    let collection = properties();
    let energy = NumberProperty::create("energy", &model(), &1.0, &collection).unwrap();
    let generic: Property = collection.get(energy.id().unwrap()).unwrap();

    assert_eq!(generic.property_type().unwrap(), NumberProperty::PROPERTY_TYPE);
    assert!(generic.is_of_type::<NumberProperty>().unwrap());
    assert!(!generic.is_of_type::<BoolProperty>().unwrap());

    let typed = generic.get_derived::<NumberProperty>().unwrap();
    assert_eq!(typed.get_data().unwrap(), 1.0);

    assert!(matches!(
        generic.get_derived::<DenseMatrixProperty>(),
        Err(Error::ObjectTypeMismatch { expected, found })
            if expected == "dense_matrix_property" && found == "number_property"
    ));
}

#[test]
fn derived_handles_share_the_property_object_type() {
    let collection = properties();
    let energy = NumberProperty::create("energy", &model(), &1.0, &collection).unwrap();
    assert!(collection.has_of_type::<Property>(energy.id().unwrap()).unwrap());
    assert!(collection.has_of_type::<SparseMatrixProperty>(energy.id().unwrap()).unwrap());
    let all: Vec<Property> = collection.query(&bson::doc! { "_objecttype": "property" }).unwrap();
    assert_eq!(all.len(), 1);
    let object: &Object = &energy;
    assert!(object.exists().unwrap());
}
