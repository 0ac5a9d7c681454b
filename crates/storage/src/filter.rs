//! Query filter evaluation
//!
//! Supported: field equality (dotted paths, array membership), `$eq`, `$ne`,
//! `$exists`, `$in`, `$nin`, `$gt`, `$gte`, `$lt`, `$lte`, `$and`, `$or`.
//! Any other operator is rejected with `Error::Storage`, never ignored.

use bson::{Bson, Document};
use chemdb_core::{Error, Result};
use std::cmp::Ordering;

use crate::compare::{compare_values, values_equal};
use crate::path::get_path;

/// Whether `doc` satisfies `filter`
///
/// # Errors
/// Returns `Error::Storage` for unsupported or malformed operators.
pub fn matches(doc: &Document, filter: &Document) -> Result<bool> {
    for (key, condition) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(key, condition)? {
                    if !matches(doc, sub)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(key, condition)? {
                    if matches(doc, sub)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            op if op.starts_with('$') => {
                return Err(Error::Storage(format!("unsupported query operator '{}'", op)));
            }
            path => field_matches(get_path(doc, path), condition)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sub_filters<'a>(op: &str, condition: &'a Bson) -> Result<Vec<&'a Document>> {
    let list = match condition {
        Bson::Array(list) if !list.is_empty() => list,
        _ => {
            return Err(Error::Storage(format!(
                "'{}' expects a non-empty array of documents",
                op
            )))
        }
    };
    list.iter()
        .map(|entry| match entry {
            Bson::Document(d) => Ok(d),
            _ => Err(Error::Storage(format!("'{}' entries must be documents", op))),
        })
        .collect()
}

fn is_operator_document(condition: &Bson) -> Option<&Document> {
    match condition {
        Bson::Document(d) if d.keys().next().map_or(false, |k| k.starts_with('$')) => Some(d),
        _ => None,
    }
}

fn field_matches(value: Option<&Bson>, condition: &Bson) -> Result<bool> {
    let ops = match is_operator_document(condition) {
        Some(ops) => ops,
        None => return Ok(equals(value, condition)),
    };
    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$eq" => equals(value, operand),
            "$ne" => !equals(value, operand),
            "$exists" => value.is_some() == truthy(operand),
            "$in" => in_list(value, operand, "$in")?,
            "$nin" => !in_list(value, operand, "$nin")?,
            "$gt" => compares(value, operand, |o| o == Ordering::Greater),
            "$gte" => compares(value, operand, |o| o != Ordering::Less),
            "$lt" => compares(value, operand, |o| o == Ordering::Less),
            "$lte" => compares(value, operand, |o| o != Ordering::Greater),
            other => {
                return Err(Error::Storage(format!(
                    "unsupported field operator '{}'",
                    other
                )))
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Equality as the store defines it: null matches a missing field, and an
/// array field matches when it equals the operand or contains it.
fn equals(value: Option<&Bson>, operand: &Bson) -> bool {
    match value {
        None => matches!(operand, Bson::Null),
        Some(v) if values_equal(v, operand) => true,
        Some(Bson::Array(items)) => items.iter().any(|item| values_equal(item, operand)),
        Some(_) => false,
    }
}

fn in_list(value: Option<&Bson>, operand: &Bson, op: &str) -> Result<bool> {
    match operand {
        Bson::Array(candidates) => Ok(candidates.iter().any(|c| equals(value, c))),
        _ => Err(Error::Storage(format!("'{}' expects an array", op))),
    }
}

fn compares(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |v: &Bson| compare_values(v, operand).map_or(false, &accept);
    match value {
        None => false,
        Some(Bson::Array(items)) => items.iter().any(check),
        Some(v) => check(v),
    }
}

pub(crate) fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(i) => *i != 0,
        Bson::Int64(i) => *i != 0,
        Bson::Double(d) => *d != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}
