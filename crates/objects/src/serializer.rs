//! Property payload serializers
//!
//! A [`Serializer`] writes one property payload as a fixed set of fields in
//! a property document and reads it back from exactly those fields:
//!
//! | Payload | Fields |
//! |---------|--------|
//! | `bool`, `f64`, `String` | `data` |
//! | `DVector<f64>` | `size`, `data` |
//! | `DMatrix<f64>` | `cols`, `rows`, `data` (column-major) |
//! | `CscMatrix<f64>` | `cols`, `rows`, `size`, `data: {row_idxs, col_idxs, values}` |
//!
//! Sizes and indices are written as 64-bit integers. Sparse triplets are
//! emitted in column-major order, one per stored entry; on read, duplicate
//! `(row, col)` entries are summed.

use bson::{doc, Array, Bson, Document};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CscMatrix};

use chemdb_core::{Error, Result};

use crate::fields::integer_from_bson;

const DATA: &str = "data";
const SIZE: &str = "size";
const ROWS: &str = "rows";
const COLS: &str = "cols";
const ROW_IDXS: &str = "row_idxs";
const COL_IDXS: &str = "col_idxs";
const VALUES: &str = "values";

/// Fixed-shape encoding of a property payload
pub trait Serializer: Sized {
    /// Append the payload fields to `builder`
    fn serialize(&self, builder: &mut Document);

    /// Projection selecting exactly the fields written by `serialize`
    fn projection() -> Document;

    /// Rebuild the payload from a document holding the projected fields
    ///
    /// # Errors
    /// Returns `Error::MissingIdOrField` if a field is absent or mistyped.
    fn deserialize(doc: &Document) -> Result<Self>;
}

impl Serializer for bool {
    fn serialize(&self, builder: &mut Document) {
        builder.insert(DATA, *self);
    }

    fn projection() -> Document {
        doc! { "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        match doc.get(DATA) {
            Some(Bson::Boolean(b)) => Ok(*b),
            _ => Err(Error::MissingIdOrField),
        }
    }
}

impl Serializer for f64 {
    fn serialize(&self, builder: &mut Document) {
        builder.insert(DATA, *self);
    }

    fn projection() -> Document {
        doc! { "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        match doc.get(DATA) {
            Some(Bson::Double(d)) => Ok(*d),
            _ => Err(Error::MissingIdOrField),
        }
    }
}

impl Serializer for String {
    fn serialize(&self, builder: &mut Document) {
        builder.insert(DATA, self.as_str());
    }

    fn projection() -> Document {
        doc! { "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        match doc.get(DATA) {
            Some(Bson::String(s)) => Ok(s.clone()),
            _ => Err(Error::MissingIdOrField),
        }
    }
}

impl Serializer for DVector<f64> {
    fn serialize(&self, builder: &mut Document) {
        builder.insert(SIZE, self.len() as i64);
        builder.insert(DATA, doubles_to_array(self.as_slice()));
    }

    fn projection() -> Document {
        doc! { "size": 1, "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        let size = size_field(doc, SIZE)?;
        let data = doubles(array_field(doc, DATA)?)?;
        check_len(size, data.len())?;
        Ok(DVector::from_vec(data))
    }
}

impl Serializer for DMatrix<f64> {
    fn serialize(&self, builder: &mut Document) {
        builder.insert(COLS, self.ncols() as i64);
        builder.insert(ROWS, self.nrows() as i64);
        builder.insert(DATA, doubles_to_array(self.as_slice()));
    }

    fn projection() -> Document {
        doc! { "cols": 1, "rows": 1, "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        let cols = size_field(doc, COLS)?;
        let rows = size_field(doc, ROWS)?;
        let data = doubles(array_field(doc, DATA)?)?;
        check_len(rows.saturating_mul(cols), data.len())?;
        Ok(DMatrix::from_vec(rows, cols, data))
    }
}

impl Serializer for CscMatrix<f64> {
    fn serialize(&self, builder: &mut Document) {
        let mut row_idxs = Array::with_capacity(self.nnz());
        let mut col_idxs = Array::with_capacity(self.nnz());
        let mut values = Array::with_capacity(self.nnz());
        for (row, col, value) in self.triplet_iter() {
            row_idxs.push(Bson::Int64(row as i64));
            col_idxs.push(Bson::Int64(col as i64));
            values.push(Bson::Double(*value));
        }
        builder.insert(COLS, self.ncols() as i64);
        builder.insert(ROWS, self.nrows() as i64);
        builder.insert(SIZE, self.nnz() as i64);
        builder.insert(
            DATA,
            doc! {
                "row_idxs": row_idxs,
                "col_idxs": col_idxs,
                "values": values,
            },
        );
    }

    fn projection() -> Document {
        doc! { "cols": 1, "rows": 1, "size": 1, "data": 1 }
    }

    fn deserialize(doc: &Document) -> Result<Self> {
        let cols = size_field(doc, COLS)?;
        let rows = size_field(doc, ROWS)?;
        let size = size_field(doc, SIZE)?;
        let data = match doc.get(DATA) {
            Some(Bson::Document(d)) => d,
            _ => return Err(Error::MissingIdOrField),
        };
        let row_idxs = indices(array_field(data, ROW_IDXS)?)?;
        let col_idxs = indices(array_field(data, COL_IDXS)?)?;
        let values = doubles(array_field(data, VALUES)?)?;
        check_len(size, row_idxs.len())?;
        check_len(size, col_idxs.len())?;
        check_len(size, values.len())?;

        let mut coo = CooMatrix::new(rows, cols);
        for ((row, col), value) in row_idxs.into_iter().zip(col_idxs).zip(values) {
            if row >= rows || col >= cols {
                return Err(Error::UnrecognizedValueShape(
                    "sparse matrix index outside the declared shape",
                ));
            }
            coo.push(row, col, value);
        }
        Ok(CscMatrix::from(&coo))
    }
}

fn doubles_to_array(values: &[f64]) -> Bson {
    Bson::Array(values.iter().map(|v| Bson::Double(*v)).collect())
}

fn array_field<'a>(doc: &'a Document, key: &str) -> Result<&'a Array> {
    match doc.get(key) {
        Some(Bson::Array(a)) => Ok(a),
        _ => Err(Error::MissingIdOrField),
    }
}

/// Non-negative integer size field
fn size_field(doc: &Document, key: &str) -> Result<usize> {
    doc.get(key)
        .and_then(integer_from_bson)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(Error::MissingIdOrField)
}

fn doubles(array: &Array) -> Result<Vec<f64>> {
    array
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Bson::Double(d) => Ok(*d),
            _ => Err(Error::ArrayElementDecode {
                index,
                expected: "double",
            }),
        })
        .collect()
}

fn indices(array: &Array) -> Result<Vec<usize>> {
    array
        .iter()
        .enumerate()
        .map(|(index, value)| {
            integer_from_bson(value)
                .and_then(|v| usize::try_from(v).ok())
                .ok_or(Error::ArrayElementDecode {
                    index,
                    expected: "index",
                })
        })
        .collect()
}

fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::ShapeMismatch { expected, found })
    }
}
