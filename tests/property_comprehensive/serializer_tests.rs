//! Payload layout tests

use bson::{doc, Bson, Document};
use chemdb::{Error, Serializer};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;
use proptest::prelude::*;

use crate::test_utils::{dense, dense_matrix, finite, sparse, sparse_matrix};

fn encode<T: Serializer>(value: &T) -> Document {
    let mut doc = Document::new();
    value.serialize(&mut doc);
    doc
}

fn keys(doc: &Document) -> Vec<&str> {
    doc.keys().map(String::as_str).collect()
}

// =============================================================================
// Dense matrix
// =============================================================================

#[test]
fn dense_matrix_is_column_major() {
    let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let doc = encode(&matrix);
    assert_eq!(doc.get_i64("rows").unwrap(), 2);
    assert_eq!(doc.get_i64("cols").unwrap(), 3);
    let data: Vec<f64> = doc
        .get_array("data")
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(data, [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(DMatrix::<f64>::deserialize(&doc).unwrap(), matrix);
}

#[test]
fn dense_matrix_shape_mismatch() {
    let doc = doc! { "rows": 2_i64, "cols": 2_i64, "data": [1.0, 2.0, 3.0] };
    assert!(matches!(
        DMatrix::<f64>::deserialize(&doc),
        Err(Error::ShapeMismatch { expected: 4, found: 3 })
    ));
}

#[test]
fn dense_matrix_accepts_int32_sizes() {
    let doc = doc! { "rows": 1, "cols": 2, "data": [1.5, 2.5] };
    let matrix = DMatrix::<f64>::deserialize(&doc).unwrap();
    assert_eq!(matrix.shape(), (1, 2));
}

#[test]
fn empty_dense_matrix() {
    let matrix = DMatrix::<f64>::zeros(0, 3);
    assert_eq!(DMatrix::<f64>::deserialize(&encode(&matrix)).unwrap().shape(), (0, 3));
}

// =============================================================================
// Dense vector
// =============================================================================

#[test]
fn vector_layout() {
    let vector = DVector::from_vec(vec![0.1, -0.2, 0.3]);
    let doc = encode(&vector);
    assert_eq!(keys(&doc), ["size", "data"]);
    assert_eq!(doc.get_i64("size").unwrap(), 3);
    assert_eq!(DVector::<f64>::deserialize(&doc).unwrap(), vector);
}

#[test]
fn vector_with_non_double_element() {
    let doc = doc! { "size": 3_i64, "data": [1.0, "x", 3.0] };
    assert!(matches!(
        DVector::<f64>::deserialize(&doc),
        Err(Error::ArrayElementDecode { index: 1, .. })
    ));
}

#[test]
fn vector_without_data() {
    let doc = doc! { "size": 3_i64 };
    assert!(matches!(DVector::<f64>::deserialize(&doc), Err(Error::MissingIdOrField)));
}

#[test]
fn vector_size_disagrees() {
    let doc = doc! { "size": 4_i64, "data": [1.0] };
    assert!(matches!(DVector::<f64>::deserialize(&doc), Err(Error::ShapeMismatch { .. })));
}

// =============================================================================
// Sparse matrix
// =============================================================================

#[test]
fn sparse_wire_shape_has_one_triplet_per_stored_entry() {
    let matrix = sparse(3, 4, &[(0, 0, 1.0), (2, 1, -2.0), (1, 3, 0.0), (0, 3, 4.5)]);
    let doc = encode(&matrix);
    assert_eq!(keys(&doc), ["cols", "rows", "size", "data"]);
    assert_eq!(doc.get_i64("size").unwrap(), 4);
    let data = doc.get_document("data").unwrap();
    for field in ["row_idxs", "col_idxs", "values"] {
        assert_eq!(data.get_array(field).unwrap().len(), 4);
    }
}

#[test]
fn sparse_triplets_are_column_major() {
    let matrix = sparse(2, 2, &[(1, 1, 4.0), (0, 1, 3.0), (1, 0, 2.0), (0, 0, 1.0)]);
    let doc = encode(&matrix);
    let values: Vec<f64> = doc
        .get_document("data")
        .unwrap()
        .get_array("values")
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(values, [1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn sparse_explicit_zero_is_kept() {
    let matrix = sparse(2, 2, &[(0, 1, 0.0)]);
    let doc = encode(&matrix);
    assert_eq!(doc.get_i64("size").unwrap(), 1);
    let decoded = CscMatrix::<f64>::deserialize(&doc).unwrap();
    assert_eq!(decoded.nnz(), 1);
}

#[test]
fn sparse_duplicates_are_summed() {
    let doc = doc! {
        "cols": 2_i64,
        "rows": 2_i64,
        "size": 3_i64,
        "data": {
            "row_idxs": [0_i64, 0_i64, 1_i64],
            "col_idxs": [1_i64, 1_i64, 0_i64],
            "values": [1.5, 2.0, 7.0],
        },
    };
    let decoded = CscMatrix::<f64>::deserialize(&doc).unwrap();
    let dense = dense(&decoded);
    assert_eq!(dense[(0, 1)], 3.5);
    assert_eq!(dense[(1, 0)], 7.0);
    assert_eq!(dense[(0, 0)], 0.0);
}

#[test]
fn sparse_size_disagrees_with_arrays() {
    let doc = doc! {
        "cols": 2_i64,
        "rows": 2_i64,
        "size": 2_i64,
        "data": { "row_idxs": [0_i64], "col_idxs": [0_i64], "values": [1.0] },
    };
    assert!(matches!(CscMatrix::<f64>::deserialize(&doc), Err(Error::ShapeMismatch { .. })));
}

#[test]
fn sparse_index_outside_shape() {
    let doc = doc! {
        "cols": 2_i64,
        "rows": 2_i64,
        "size": 1_i64,
        "data": { "row_idxs": [5_i64], "col_idxs": [0_i64], "values": [1.0] },
    };
    assert!(matches!(
        CscMatrix::<f64>::deserialize(&doc),
        Err(Error::UnrecognizedValueShape(_))
    ));
}

#[test]
fn sparse_without_triplets() {
    let doc = doc! { "cols": 2_i64, "rows": 2_i64, "size": 0_i64 };
    assert!(matches!(CscMatrix::<f64>::deserialize(&doc), Err(Error::MissingIdOrField)));
}

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn scalar_layouts() {
    assert_eq!(encode(&true), doc! { "data": true });
    assert_eq!(encode(&-1.25), doc! { "data": -1.25 });
    assert_eq!(encode(&"gs".to_string()), doc! { "data": "gs" });
    assert_eq!(bool::projection(), doc! { "data": 1 });
}

#[test]
fn scalar_with_wrong_wire_type_is_missing() {
    let doc = doc! { "data": "1.0" };
    assert!(matches!(f64::deserialize(&doc), Err(Error::MissingIdOrField)));
    assert!(matches!(bool::deserialize(&doc), Err(Error::MissingIdOrField)));
    assert!(matches!(String::deserialize(&doc! { "data": Bson::Null }), Err(Error::MissingIdOrField)));
}

#[test]
fn projections_cover_serialized_fields() {
    fn covered<T: Serializer>(value: &T) {
        let written = encode(value);
        let projection = T::projection();
        let mut written_keys = keys(&written);
        let mut projected_keys = keys(&projection);
        written_keys.sort_unstable();
        projected_keys.sort_unstable();
        assert_eq!(written_keys, projected_keys);
    }
    covered(&false);
    covered(&0.0);
    covered(&String::new());
    covered(&DVector::from_vec(vec![1.0]));
    covered(&DMatrix::from_element(2, 2, 1.0));
    covered(&sparse(2, 2, &[(0, 0, 1.0)]));
}

// =============================================================================
// Round trips
// =============================================================================

proptest! {
    #[test]
    fn doubles_round_trip_bit_exact(value in finite()) {
        let decoded = f64::deserialize(&encode(&value)).unwrap();
        prop_assert_eq!(decoded.to_bits(), value.to_bits());
    }

    #[test]
    fn strings_round_trip(value in ".*") {
        prop_assert_eq!(String::deserialize(&encode(&value)).unwrap(), value);
    }

    #[test]
    fn vectors_round_trip(values in prop::collection::vec(finite(), 0..32)) {
        let vector = DVector::from_vec(values);
        prop_assert_eq!(DVector::<f64>::deserialize(&encode(&vector)).unwrap(), vector);
    }

    #[test]
    fn dense_matrices_round_trip(matrix in dense_matrix()) {
        prop_assert_eq!(DMatrix::<f64>::deserialize(&encode(&matrix)).unwrap(), matrix);
    }

    #[test]
    fn sparse_matrices_round_trip(matrix in sparse_matrix()) {
        let doc = encode(&matrix);
        prop_assert_eq!(doc.get_i64("size").unwrap(), matrix.nnz() as i64);
        let decoded = CscMatrix::<f64>::deserialize(&doc).unwrap();
        prop_assert_eq!(decoded.nrows(), matrix.nrows());
        prop_assert_eq!(decoded.ncols(), matrix.ncols());
        prop_assert_eq!(dense(&decoded), dense(&matrix));
    }
}
