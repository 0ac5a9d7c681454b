//! `exists` versus `non_null`

use bson::{doc, Bson};
use chemdb::{fields, Error};

use crate::test_utils::{dangling_object, object_with};

#[test]
fn empty_string_exists_but_is_null() {
    let object = object_with(doc! { "comment": "" });
    assert!(fields::exists(&object, "comment").unwrap());
    assert!(!fields::non_null(&object, "comment").unwrap());
}

#[test]
fn absent_field_is_neither() {
    let object = object_with(doc! { "other": 1 });
    assert!(!fields::exists(&object, "comment").unwrap());
    assert!(!fields::non_null(&object, "comment").unwrap());
}

#[test]
fn stored_null_exists_but_is_null() {
    let object = object_with(doc! { "comment": Bson::Null });
    assert!(fields::exists(&object, "comment").unwrap());
    assert!(!fields::non_null(&object, "comment").unwrap());
}

#[test]
fn present_value_is_both() {
    let object = object_with(doc! { "comment": "text", "count": 0, "flag": false });
    for field in ["comment", "count", "flag"] {
        assert!(fields::exists(&object, field).unwrap());
        assert!(fields::non_null(&object, field).unwrap());
    }
}

#[test]
fn nested_paths() {
    let object = object_with(doc! { "results": { "comment": "", "energy": -1.0 } });
    assert!(fields::exists(&object, "results.comment").unwrap());
    assert!(!fields::non_null(&object, "results.comment").unwrap());
    assert!(fields::non_null(&object, "results.energy").unwrap());
    assert!(!fields::exists(&object, "results.missing").unwrap());
}

#[test]
fn exists_on_missing_document_fails() {
    assert!(matches!(fields::exists(&dangling_object(), "comment"), Err(Error::IdNotFound)));
    assert!(!fields::non_null(&dangling_object(), "comment").unwrap());
}

#[test]
fn non_null_tracks_writes() {
    let object = object_with(doc! { "comment": "" });
    fields::set(&object, "comment", &"note".to_string()).unwrap();
    assert!(fields::non_null(&object, "comment").unwrap());
    fields::set(&object, "comment", &String::new()).unwrap();
    assert!(!fields::non_null(&object, "comment").unwrap());
    fields::unset(&object, "comment").unwrap();
    assert!(!fields::exists(&object, "comment").unwrap());
}
