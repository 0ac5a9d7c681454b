//! Nested settings value codec tests

use bson::{doc, Bson};
use chemdb::value_collection::{
    deserialize_collection, deserialize_value, serialize_collection, serialize_value,
};
use chemdb::{Error, GenericValue, ParametrizedOptionValue, ValueCollection};

/// List of collections, one of which holds an option value with settings
fn three_level_settings() -> ValueCollection {
    let mut scf = ValueCollection::new();
    scf.set("max_iterations", 100);
    scf.set("thresholds", vec![1e-5, 1e-7]);

    let mut optimizer = ValueCollection::new();
    optimizer.set("algorithm", ParametrizedOptionValue::new("bfgs", scf));
    optimizer.set("labels", vec!["a".to_string(), "b".to_string()]);

    let mut spin = ValueCollection::new();
    spin.set("mode", "unrestricted");

    let mut settings = ValueCollection::new();
    settings.set("stages", vec![optimizer, spin]);
    settings.set("converge", true);
    settings.set("charge_steps", vec![0, -1, 1]);
    settings
}

#[test]
fn three_level_nesting_round_trips() {
    let settings = three_level_settings();
    let encoded = serialize_collection(&settings);
    assert_eq!(deserialize_collection(&encoded).unwrap(), settings);
}

#[test]
fn encoded_layout() {
    let encoded = serialize_collection(&three_level_settings());
    let stages = encoded.get_document("stages").unwrap();
    assert_eq!(stages.get_str("type").unwrap(), "value_coll");
    let first = stages.get_array("list").unwrap()[0].as_document().unwrap();
    let algorithm = first.get_document("algorithm").unwrap();
    assert_eq!(algorithm.get_str("selectedOption").unwrap(), "bfgs");
    assert_eq!(
        algorithm
            .get_document("optionSettings")
            .unwrap()
            .get_i32("max_iterations")
            .unwrap(),
        100
    );
    assert_eq!(encoded.get_document("charge_steps").unwrap().get_str("type").unwrap(), "int");
    assert_eq!(first.get_document("labels").unwrap().get_str("type").unwrap(), "str");
}

#[test]
fn entry_order_is_preserved() {
    let settings: ValueCollection = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
    let encoded = serialize_collection(&settings);
    let keys: Vec<&str> = encoded.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn scalars_encode_natively() {
    assert_eq!(serialize_value(&GenericValue::Int(3)), Bson::Int32(3));
    assert_eq!(serialize_value(&GenericValue::Double(0.5)), Bson::Double(0.5));
    assert_eq!(serialize_value(&GenericValue::Bool(false)), Bson::Boolean(false));
    assert_eq!(
        serialize_value(&GenericValue::String("x".into())),
        Bson::String("x".into())
    );
}

#[test]
fn int64_scalar_is_narrowed() {
    assert_eq!(deserialize_value(&Bson::Int64(7)).unwrap(), GenericValue::Int(7));
    assert!(matches!(
        deserialize_value(&Bson::Int64(1 << 40)),
        Err(Error::IntegerOverflow(_))
    ));
}

#[test]
fn unknown_list_tag() {
    let wire = Bson::Document(doc! { "type": "complex", "list": [] });
    assert!(matches!(
        deserialize_value(&wire),
        Err(Error::UnrecognizedListType(tag)) if tag == "complex"
    ));
}

#[test]
fn raw_array_is_unrecognized() {
    let wire = Bson::Array(vec![Bson::Int32(1)]);
    assert!(matches!(deserialize_value(&wire), Err(Error::UnrecognizedValueShape(_))));
}

#[test]
fn null_is_unrecognized() {
    assert!(matches!(deserialize_value(&Bson::Null), Err(Error::UnrecognizedValueShape(_))));
}

#[test]
fn list_element_of_wrong_type() {
    let wire = Bson::Document(doc! { "type": "double", "list": [1.0, "two", 3.0] });
    assert!(matches!(
        deserialize_value(&wire),
        Err(Error::ArrayElementDecode { index: 1, .. })
    ));
}

#[test]
fn list_tag_takes_precedence_over_option() {
    let wire = Bson::Document(doc! {
        "type": "str",
        "list": ["a"],
        "selectedOption": "ignored",
        "optionSettings": {},
    });
    assert_eq!(
        deserialize_value(&wire).unwrap(),
        GenericValue::StringList(vec!["a".to_string()])
    );
}

#[test]
fn option_takes_precedence_over_plain_collection() {
    let wire = Bson::Document(doc! { "selectedOption": "lbfgs", "optionSettings": { "m": 5 } });
    let decoded = deserialize_value(&wire).unwrap();
    let option = decoded.as_option().unwrap();
    assert_eq!(option.selected_option, "lbfgs");
    assert_eq!(option.option_settings.get("m"), Some(&GenericValue::Int(5)));
}

#[test]
fn plain_document_is_a_collection() {
    let wire = Bson::Document(doc! { "a": 1, "b": { "c": "d" } });
    let decoded = deserialize_value(&wire).unwrap();
    let collection = decoded.as_collection().unwrap();
    assert_eq!(collection.len(), 2);
    assert!(collection.get("b").unwrap().as_collection().unwrap().contains("c"));
}
