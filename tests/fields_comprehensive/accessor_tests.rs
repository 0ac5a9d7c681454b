//! get/set/unset through entity handles

use bson::doc;
use chemdb::{fields, Error, Id, Object};

use crate::test_utils::{dangling_object, memory_collection, object_with};

#[test]
fn set_then_get() {
    let object = object_with(doc! { "_lastmodified": bson::DateTime::now() });
    fields::set(&object, "charge", &-2).unwrap();
    fields::set(&object, "label", &"water".to_string()).unwrap();
    fields::set(&object, "weights", &vec![0.5, 1.5]).unwrap();
    assert_eq!(fields::get::<i32>(&object, "charge").unwrap(), -2);
    assert_eq!(fields::get::<String>(&object, "label").unwrap(), "water");
    assert_eq!(fields::get::<Vec<f64>>(&object, "weights").unwrap(), vec![0.5, 1.5]);
}

#[test]
fn dotted_paths() {
    let object = object_with(doc! { "settings": { "scf": { "threshold": 1e-6 } } });
    assert_eq!(
        fields::get::<f64>(&object, "settings.scf.threshold").unwrap(),
        1e-6
    );
    fields::set(&object, "settings.scf.max_iterations", &50).unwrap();
    let doc = object.raw_content().unwrap();
    let scf = doc.get_document("settings").unwrap().get_document("scf").unwrap();
    assert_eq!(scf.get_i32("max_iterations").unwrap(), 50);
    assert_eq!(scf.get_f64("threshold").unwrap(), 1e-6);
}

#[test]
fn partial_get_collapses_absence_and_mismatch() {
    let object = object_with(doc! { "energy": "not a number" });
    assert_eq!(fields::partial_get::<f64>(&object, "energy").unwrap(), None);
    assert_eq!(fields::partial_get::<f64>(&object, "missing").unwrap(), None);
    assert_eq!(fields::partial_get::<f64>(&dangling_object(), "energy").unwrap(), None);
}

#[test]
fn get_escalates_to_missing_field() {
    let object = object_with(doc! { "energy": "not a number" });
    assert!(matches!(fields::get::<f64>(&object, "energy"), Err(Error::MissingIdOrField)));
    assert!(matches!(fields::get::<f64>(&object, "missing"), Err(Error::MissingIdOrField)));
}

#[test]
fn get_overflow_is_not_soft() {
    let too_big = i64::from(i32::MAX) + 10;
    let object = object_with(doc! { "charge": too_big });
    assert!(matches!(fields::partial_get::<i32>(&object, "charge"), Err(Error::IntegerOverflow(_))));
}

#[test]
fn stored_array_with_bad_element() {
    let object = object_with(doc! { "structures": [Id::new(), "oops", Id::new()] });
    assert!(matches!(
        fields::get::<Vec<Id>>(&object, "structures"),
        Err(Error::ArrayElementDecode { index: 1, .. })
    ));
}

#[test]
fn unset_removes_the_field() {
    let object = object_with(doc! { "comment": "hello", "other": 1 });
    fields::unset(&object, "comment").unwrap();
    let doc = object.raw_content().unwrap();
    assert!(!doc.contains_key("comment"));
    assert!(doc.contains_key("other"));
}

#[test]
fn writes_touch_last_modified() {
    let object = object_with(doc! {});
    assert!(!object.has_last_modified_timestamp().unwrap());
    fields::set(&object, "flag", &true).unwrap();
    assert!(object.has_last_modified_timestamp().unwrap());

    let other = object_with(doc! { "comment": "x" });
    fields::unset(&other, "comment").unwrap();
    assert!(other.has_last_modified_timestamp().unwrap());
}

#[test]
fn set_on_missing_document_is_silent() {
    let object = dangling_object();
    fields::set(&object, "charge", &1).unwrap();
    assert!(!object.exists().unwrap());
}

#[test]
fn preconditions_are_checked_before_any_round_trip() {
    let unlinked = Object::new(Some(Id::new()), None);
    assert!(matches!(fields::get::<i32>(&unlinked, "charge"), Err(Error::MissingLinkedCollection)));
    assert!(matches!(fields::set(&unlinked, "charge", &1), Err(Error::MissingLinkedCollection)));

    let no_id = Object::new(None, Some(memory_collection("objects")));
    assert!(matches!(fields::get::<i32>(&no_id, "charge"), Err(Error::MissingId)));
    assert!(matches!(fields::unset(&no_id, "charge"), Err(Error::MissingId)));
    assert!(matches!(fields::non_null(&no_id, "charge"), Err(Error::MissingId)));

    let neither = Object::default();
    assert!(matches!(fields::exists(&neither, "charge"), Err(Error::MissingLinkedCollection)));
}
